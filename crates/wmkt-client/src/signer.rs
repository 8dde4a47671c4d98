//! Header set attached to every authenticated Marketplace call.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use uuid::Uuid;

use crate::auth::AccessToken;
use crate::error::MarketplaceError;

pub const WM_SVC_NAME: HeaderName = HeaderName::from_static("wm_svc.name");
pub const WM_QOS_CORRELATION_ID: HeaderName = HeaderName::from_static("wm_qos.correlation_id");
pub const WM_SEC_ACCESS_TOKEN: HeaderName = HeaderName::from_static("wm_sec.access_token");
pub const WM_CONSUMER_CHANNEL_TYPE: HeaderName =
    HeaderName::from_static("wm_consumer.channel.type");

fn json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// Headers for one request, plus the correlation id they carry so callers
/// can log it.
#[derive(Debug)]
pub struct SignedHeaders {
    pub headers: HeaderMap,
    pub correlation_id: String,
}

/// Builds the marketplace header set from a bearer token.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service_name: HeaderValue,
    channel_type: Option<HeaderValue>,
}

impl RequestSigner {
    /// # Errors
    ///
    /// Returns [`MarketplaceError::InvalidState`] if the service name or
    /// channel type cannot be sent as a header value.
    pub fn new(service_name: &str, channel_type: Option<&str>) -> Result<Self, MarketplaceError> {
        let service_name = HeaderValue::from_str(service_name).map_err(|e| {
            MarketplaceError::InvalidState(format!("service name is not a valid header: {e}"))
        })?;
        let channel_type = channel_type
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| {
                MarketplaceError::InvalidState(format!("channel type is not a valid header: {e}"))
            })?;
        Ok(Self {
            service_name,
            channel_type,
        })
    }

    /// Headers shared by the token exchange and authenticated calls: service
    /// name, a fresh correlation id, `Accept: application/json`, and the
    /// channel type when configured.
    #[must_use]
    pub fn base_headers(&self) -> SignedHeaders {
        let correlation_id = new_correlation_id();
        let mut headers = HeaderMap::new();
        headers.insert(WM_SVC_NAME, self.service_name.clone());
        // A hyphenated UUID is always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            headers.insert(WM_QOS_CORRELATION_ID, value);
        }
        headers.insert(ACCEPT, json());
        if let Some(channel) = &self.channel_type {
            headers.insert(WM_CONSUMER_CHANNEL_TYPE, channel.clone());
        }
        SignedHeaders {
            headers,
            correlation_id,
        }
    }

    /// Full header set for an authenticated JSON call.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::InvalidState`] if `token` is empty or
    /// contains characters that cannot appear in a header.
    pub fn headers(&self, token: &AccessToken) -> Result<SignedHeaders, MarketplaceError> {
        if token.is_empty() {
            return Err(MarketplaceError::InvalidState(
                "no access token available; fetch a token before calling the API".to_string(),
            ));
        }

        let invalid =
            |_| MarketplaceError::InvalidState("access token is not a valid header value".into());
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(invalid)?;
        bearer.set_sensitive(true);
        let mut raw = HeaderValue::from_str(token.expose()).map_err(invalid)?;
        raw.set_sensitive(true);

        let mut signed = self.base_headers();
        signed.headers.insert(AUTHORIZATION, bearer);
        signed.headers.insert(WM_SEC_ACCESS_TOKEN, raw);
        signed.headers.insert(CONTENT_TYPE, json());
        Ok(signed)
    }
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}
