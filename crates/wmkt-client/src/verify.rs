//! Read-back checks run after a feed reports success.
//!
//! Both checks answer with a plain `bool`: a failed read is logged and
//! counts as "not confirmed".

use crate::auth::AccessToken;
use crate::client::{decode, read_body, MarketplaceClient};
use crate::error::MarketplaceError;
use crate::types::InventoryResponse;

impl MarketplaceClient {
    /// `true` if `GET /items/{sku}` answers 2xx.
    pub async fn verify_item_listed(&self, token: &AccessToken, sku: &str) -> bool {
        match self.fetch_item(token, sku).await {
            Ok(()) => {
                tracing::info!(sku, "item listing confirmed");
                true
            }
            Err(err) => {
                tracing::warn!(sku, error = %err, "item listing not confirmed");
                false
            }
        }
    }

    /// `true` if the marketplace reports exactly `expected` units for `sku`.
    ///
    /// The reported amount may be a JSON number or a numeric string; either
    /// way it must equal `expected` as an integer.
    pub async fn verify_inventory_quantity(
        &self,
        token: &AccessToken,
        sku: &str,
        expected: u32,
    ) -> bool {
        match self.inventory_quantity(token, sku).await {
            Ok(Some(actual)) if actual == i64::from(expected) => {
                tracing::info!(sku, quantity = actual, "inventory quantity confirmed");
                true
            }
            Ok(actual) => {
                tracing::warn!(sku, expected, actual, "inventory quantity mismatch");
                false
            }
            Err(err) => {
                tracing::warn!(sku, error = %err, "inventory quantity could not be read");
                false
            }
        }
    }

    /// Reads the on-hand quantity for `sku`; `None` when the response has no
    /// integer amount.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if `token` is empty.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`MarketplaceError::Deserialize`] if the body is not JSON.
    pub async fn inventory_quantity(
        &self,
        token: &AccessToken,
        sku: &str,
    ) -> Result<Option<i64>, MarketplaceError> {
        let signed = self.signer.headers(token)?;
        let url = self.endpoint_with_query(&["inventory"], &[("sku", sku)])?;
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
                context: format!("inventory for {sku}"),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: InventoryResponse = decode(&body, format!("inventory for {sku}"))?;
        Ok(parsed.quantity.and_then(|q| q.amount.as_integer()))
    }

    async fn fetch_item(&self, token: &AccessToken, sku: &str) -> Result<(), MarketplaceError> {
        let signed = self.signer.headers(token)?;
        let url = self.endpoint(&["items", sku])?;
        let response = self
            .client
            .get(url)
            .headers(signed.headers)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = read_body(response).await;
        Err(MarketplaceError::UnexpectedStatus {
            context: format!("item {sku}"),
            status: status.as_u16(),
            body,
        })
    }
}
