//! Client-credentials token exchange.

use crate::client::{decode, read_body, MarketplaceClient};
use crate::error::MarketplaceError;
use crate::types::TokenResponse;

/// Opaque bearer token for one run.
///
/// Expiry is not tracked: a token is fetched at the start of a run and
/// dropped at its end. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

impl MarketplaceClient {
    /// Exchanges the client credentials for a bearer token.
    ///
    /// Sends `grant_type=client_credentials` as a form body with HTTP basic
    /// authentication. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if the id or secret is blank.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::Auth`] on any non-2xx status.
    /// - [`MarketplaceError::Deserialize`] if the body is not JSON.
    /// - [`MarketplaceError::Decode`] if `access_token` is missing or empty.
    pub async fn fetch_token(&self) -> Result<AccessToken, MarketplaceError> {
        if !self.credentials.is_complete() {
            return Err(MarketplaceError::InvalidState(
                "client id and secret must both be set".to_string(),
            ));
        }

        let signed = self.signer.base_headers();
        tracing::debug!(
            correlation_id = %signed.correlation_id,
            url = %self.auth_url,
            "requesting access token"
        );

        let response = self
            .client
            .post(self.auth_url.clone())
            .headers(signed.headers)
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            tracing::warn!(status = status.as_u16(), "token request rejected");
            return Err(MarketplaceError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: TokenResponse = decode(&body, "token response")?;

        if parsed.access_token.trim().is_empty() {
            return Err(MarketplaceError::Decode {
                context: "token response".to_string(),
                reason: "access_token is missing or empty".to_string(),
            });
        }

        tracing::info!(
            token_type = parsed.token_type.as_deref().unwrap_or("bearer"),
            expires_in = parsed.expires_in,
            "access token acquired"
        );
        Ok(AccessToken::new(parsed.access_token))
    }
}
