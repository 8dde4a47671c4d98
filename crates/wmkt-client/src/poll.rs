//! Feed status polling.
//!
//! [`MarketplaceClient::poll_feed`] reads `GET /feeds/{feedId}` up to
//! [`PollPolicy::max_attempts`] times and stops at the first terminal
//! status. The wait between attempts comes from a [`PollDelay`] so tests can
//! run the loop without real sleeps.
//!
//! Running out of attempts is not an error: it comes back as
//! [`FeedOutcome::TimedOut`]. A status read that fails (network, non-2xx,
//! malformed body) is logged and uses up one attempt.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AccessToken;
use crate::client::{decode, read_body, MarketplaceClient};
use crate::error::MarketplaceError;
use crate::types::{FeedId, FeedStatus, FeedStatusResponse};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How long to wait after a non-terminal poll attempt.
pub trait PollDelay: Send + Sync {
    /// Delay before the attempt following `attempt` (1-based).
    fn wait(&self, attempt: u32) -> Duration;
}

/// The same delay after every attempt.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl PollDelay for FixedDelay {
    fn wait(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Attempt budget and inter-attempt delay for one poll loop.
#[derive(Clone)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Arc<dyn PollDelay>,
}

impl PollPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Arc<dyn PollDelay>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Fixed-interval policy.
    #[must_use]
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self::new(max_attempts, Arc::new(FixedDelay(interval)))
    }

    /// No waiting between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }
}

impl std::fmt::Debug for PollPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("first_delay", &self.delay.wait(1))
            .finish()
    }
}

/// One status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStatusReport {
    pub status: FeedStatus,
    pub items_received: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The feed reached `PROCESSED`.
    Processed { items_succeeded: u64, attempts: u32 },
    /// The feed reached `ERROR`.
    Rejected {
        items_succeeded: u64,
        attempts: u32,
    },
    /// The attempt budget ran out before a terminal status.
    TimedOut {
        attempts: u32,
        last_status: Option<String>,
    },
}

impl FeedOutcome {
    /// `true` only for a processed feed with at least one succeeded item.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FeedOutcome::Processed { items_succeeded, .. } if *items_succeeded > 0)
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            FeedOutcome::Processed { attempts, .. }
            | FeedOutcome::Rejected { attempts, .. }
            | FeedOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Converts a failed outcome into the error that explains it.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::PollTimeout`] for [`FeedOutcome::TimedOut`].
    /// - [`MarketplaceError::FeedRejected`] for an `ERROR` feed or a
    ///   processed feed with no succeeded items.
    pub fn into_result(self, feed_id: &FeedId) -> Result<u64, MarketplaceError> {
        match self {
            FeedOutcome::Processed {
                items_succeeded, ..
            } if items_succeeded > 0 => Ok(items_succeeded),
            FeedOutcome::Processed {
                items_succeeded, ..
            } => Err(MarketplaceError::FeedRejected {
                feed_id: feed_id.to_string(),
                status: FeedStatus::Processed.to_string(),
                items_succeeded,
            }),
            FeedOutcome::Rejected {
                items_succeeded, ..
            } => Err(MarketplaceError::FeedRejected {
                feed_id: feed_id.to_string(),
                status: FeedStatus::Error.to_string(),
                items_succeeded,
            }),
            FeedOutcome::TimedOut { attempts, .. } => Err(MarketplaceError::PollTimeout {
                feed_id: feed_id.to_string(),
                attempts,
            }),
        }
    }
}

impl MarketplaceClient {
    /// Reads the current status of a feed once.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if `token` is empty.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`MarketplaceError::Deserialize`] if the body has no `feedStatus`.
    pub async fn feed_status(
        &self,
        token: &AccessToken,
        feed_id: &FeedId,
    ) -> Result<FeedStatusReport, MarketplaceError> {
        let signed = self.signer.headers(token)?;
        let url = self.endpoint(&["feeds", feed_id.as_str()])?;
        let response = self
            .client
            .get(url)
            .headers(signed.headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(MarketplaceError::UnexpectedStatus {
                context: format!("feed {feed_id} status"),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: FeedStatusResponse = decode(&body, format!("feed {feed_id} status"))?;
        Ok(FeedStatusReport {
            status: FeedStatus::parse(&parsed.feed_status),
            items_received: parsed.items_received,
            items_succeeded: parsed.items_succeeded,
            items_failed: parsed.items_failed,
        })
    }

    /// Polls a feed until it reaches a terminal status or the attempt budget
    /// is spent. Never sends more than `policy.max_attempts` requests and
    /// never sleeps after the last one.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::InvalidState`] if `token` is empty. Every
    /// other failure is folded into the returned [`FeedOutcome`].
    pub async fn poll_feed(
        &self,
        token: &AccessToken,
        feed_id: &FeedId,
        policy: &PollPolicy,
    ) -> Result<FeedOutcome, MarketplaceError> {
        if token.is_empty() {
            return Err(MarketplaceError::InvalidState(
                "no access token available; fetch a token before polling".to_string(),
            ));
        }

        let max_attempts = policy.max_attempts.max(1);
        let mut last_status = None;

        for attempt in 1..=max_attempts {
            match self.feed_status(token, feed_id).await {
                Ok(report) => {
                    tracing::info!(
                        feed_id = %feed_id,
                        attempt,
                        max_attempts,
                        status = %report.status,
                        items_received = report.items_received,
                        items_succeeded = report.items_succeeded,
                        items_failed = report.items_failed,
                        "feed status"
                    );
                    match report.status {
                        FeedStatus::Processed => {
                            return Ok(FeedOutcome::Processed {
                                items_succeeded: report.items_succeeded,
                                attempts: attempt,
                            });
                        }
                        FeedStatus::Error => {
                            return Ok(FeedOutcome::Rejected {
                                items_succeeded: report.items_succeeded,
                                attempts: attempt,
                            });
                        }
                        FeedStatus::Pending(raw) => last_status = Some(raw),
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        feed_id = %feed_id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "feed status read failed"
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(policy.delay.wait(attempt)).await;
            }
        }

        tracing::warn!(feed_id = %feed_id, max_attempts, "feed did not finish processing");
        Ok(FeedOutcome::TimedOut {
            attempts: max_attempts,
            last_status,
        })
    }
}
