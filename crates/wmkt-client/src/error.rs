use thiserror::Error;

use crate::types::FeedKind;

/// Errors returned by the Marketplace API client.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint rejected the credential exchange.
    #[error("authentication failed with HTTP {status}: {body}")]
    Auth { status: u16, body: String },

    /// A 2xx response body was not valid JSON for the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response body parsed but lacks a value the caller needs.
    #[error("could not decode {context}: {reason}")]
    Decode { context: String, reason: String },

    /// A read endpoint answered with a non-2xx status.
    #[error("unexpected HTTP {status} from {context}: {body}")]
    UnexpectedStatus {
        context: String,
        status: u16,
        body: String,
    },

    /// An operation was invoked without the state it needs (e.g. an empty token).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The feed endpoint did not accept the payload.
    #[error("{kind} feed rejected with HTTP {status}: {body}")]
    Submission {
        kind: FeedKind,
        status: u16,
        body: String,
    },

    /// The feed never reached a terminal status within the attempt budget.
    #[error("feed {feed_id} still pending after {attempts} status checks")]
    PollTimeout { feed_id: String, attempts: u32 },

    /// The feed reached a terminal status without any item succeeding.
    #[error("feed {feed_id} finished as {status} with {items_succeeded} items succeeded")]
    FeedRejected {
        feed_id: String,
        status: String,
        items_succeeded: u64,
    },

    /// The marketplace state read back after a feed does not match what was sent.
    #[error("verification failed for sku {sku}: expected {expected}")]
    VerificationMismatch { sku: String, expected: String },

    /// A shipping or tracking call was rejected.
    #[error("{operation} rejected with HTTP {status}: {body}")]
    OrderOperation {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
