//! HTTP client for the Walmart Marketplace REST API.
//!
//! Wraps `reqwest` with the marketplace's credential exchange, header
//! signing and typed error handling. The operations themselves live in
//! sibling modules as further `impl MarketplaceClient` blocks: `auth`,
//! `feeds`, `poll`, `verify` and `orders`.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use wmkt_core::{AppConfig, Credentials};

use crate::error::MarketplaceError;
use crate::signer::RequestSigner;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "wmkt/0.1 (seller-operations)";
const DEFAULT_SERVICE_NAME: &str = "Walmart Marketplace";

/// Transport and header settings that are not part of the credentials.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub service_name: String,
    pub channel_type: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            channel_type: None,
        }
    }
}

/// Client for the Walmart Marketplace REST API.
///
/// Holds the HTTP client, credentials, the auth and base URLs, and the
/// header signer. Use [`MarketplaceClient::from_app_config`] in the CLI or
/// [`MarketplaceClient::with_urls`] to point at a mock server in tests.
pub struct MarketplaceClient {
    pub(crate) client: Client,
    pub(crate) credentials: Credentials,
    pub(crate) auth_url: Url,
    pub(crate) base_url: Url,
    pub(crate) signer: RequestSigner,
}

impl MarketplaceClient {
    /// Builds a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// See [`MarketplaceClient::with_urls`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, MarketplaceError> {
        let options = ClientOptions {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            service_name: config.service_name.clone(),
            channel_type: config.channel_type.clone(),
        };
        Self::with_urls(
            config.credentials.clone(),
            &config.auth_url,
            &config.base_url,
            &options,
        )
    }

    /// Builds a client against explicit auth and base URLs.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::Transport`] if the `reqwest::Client` cannot be built.
    /// - [`MarketplaceError::InvalidUrl`] if either URL does not parse or
    ///   cannot carry path segments.
    /// - [`MarketplaceError::InvalidState`] if the service name or channel
    ///   type is not a valid header value.
    pub fn with_urls(
        credentials: Credentials,
        auth_url: &str,
        base_url: &str,
        options: &ClientOptions,
    ) -> Result<Self, MarketplaceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        let auth_url = parse_url(auth_url)?;
        // Normalise so path segments are appended after the last base segment
        // rather than replacing it.
        let base_url = parse_url(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketplaceError::InvalidUrl {
                url: base_url.to_string(),
                reason: "base URL cannot carry path segments".to_string(),
            });
        }

        let signer =
            RequestSigner::new(&options.service_name, options.channel_type.as_deref())?;

        Ok(Self {
            client,
            credentials,
            auth_url,
            base_url,
            signer,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketplaceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| MarketplaceError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Like [`endpoint`](Self::endpoint) with query parameters appended.
    pub(crate) fn endpoint_with_query(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, MarketplaceError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

fn parse_url(raw: &str) -> Result<Url, MarketplaceError> {
    Url::parse(raw).map_err(|e| MarketplaceError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Reads a response body for an error message, never failing.
pub(crate) async fn read_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"))
}

/// Parses a JSON body into `T`, mapping failures to [`MarketplaceError::Deserialize`].
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    body: &str,
    context: impl Into<String>,
) -> Result<T, MarketplaceError> {
    serde_json::from_str(body).map_err(|source| MarketplaceError::Deserialize {
        context: context.into(),
        source,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
