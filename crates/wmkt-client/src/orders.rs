//! Released-order lookup and shipment updates.
//!
//! Fulfilment and tracking updates both post to
//! `POST /orders/{purchaseOrderId}/shipping` with the same
//! `orderShipment.orderLines.orderLine[]` body: the line is marked
//! `Shipped` and carries its `trackingInfo`. A tracking update re-sends the
//! line with the new tracking details.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::auth::AccessToken;
use crate::client::{decode, read_body, MarketplaceClient};
use crate::error::MarketplaceError;
use crate::types::{Order, OrderLine, OrdersResponse};

pub const DEFAULT_ORDER_LIMIT: u32 = 10;
pub const PLACEHOLDER_CARRIER: &str = "UPS";
pub const PLACEHOLDER_METHOD_CODE: &str = "Standard";

/// Filters for the released-orders lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub limit: u32,
    pub created_start_date: Option<NaiveDate>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ORDER_LIMIT,
            created_start_date: None,
        }
    }
}

/// Shipment details attached to an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingInfo {
    pub carrier: String,
    pub tracking_number: String,
    pub ship_date_time: DateTime<Utc>,
    pub method_code: String,
    pub tracking_url: Option<String>,
}

impl TrackingInfo {
    /// Tracking with the fixed `UPS` / `Standard` carrier and method.
    #[must_use]
    pub fn placeholder(tracking_number: impl Into<String>, shipped_at: DateTime<Utc>) -> Self {
        Self {
            carrier: PLACEHOLDER_CARRIER.to_string(),
            tracking_number: tracking_number.into(),
            ship_date_time: shipped_at,
            method_code: PLACEHOLDER_METHOD_CODE.to_string(),
            tracking_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub order_shipment: OrderShipment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderShipment {
    pub order_lines: ShipmentLines,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentLines {
    pub order_line: Vec<ShipmentLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentLine {
    pub line_number: String,
    pub order_line_statuses: LineStatuses,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatuses {
    pub order_line_status: Vec<LineStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatus {
    pub status: &'static str,
    pub status_quantity: StatusQuantity,
    pub tracking_info: TrackingPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuantity {
    pub unit_of_measurement: &'static str,
    pub amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPayload {
    /// Epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ship_date_time: DateTime<Utc>,
    pub carrier_name: CarrierName,
    pub method_code: String,
    pub tracking_number: String,
    #[serde(rename = "trackingURL", skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CarrierName {
    pub carrier: String,
}

impl ShipmentRequest {
    /// Marks `line` shipped with `tracking`.
    #[must_use]
    pub fn shipped(line: &OrderLine, tracking: &TrackingInfo) -> Self {
        Self {
            order_shipment: OrderShipment {
                order_lines: ShipmentLines {
                    order_line: vec![ShipmentLine {
                        line_number: line.line_number.clone(),
                        order_line_statuses: LineStatuses {
                            order_line_status: vec![LineStatus {
                                status: "Shipped",
                                status_quantity: StatusQuantity {
                                    unit_of_measurement: "EACH",
                                    amount: line.quantity().to_string(),
                                },
                                tracking_info: TrackingPayload {
                                    ship_date_time: tracking.ship_date_time,
                                    carrier_name: CarrierName {
                                        carrier: tracking.carrier.clone(),
                                    },
                                    method_code: tracking.method_code.clone(),
                                    tracking_number: tracking.tracking_number.clone(),
                                    tracking_url: tracking.tracking_url.clone(),
                                },
                            }],
                        },
                    }],
                },
            },
        }
    }
}

impl MarketplaceClient {
    /// Fetches released orders and returns the first one, if any.
    ///
    /// Only the first page is read.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if `token` is empty.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::OrderOperation`] on any status other than 200/201.
    /// - [`MarketplaceError::Deserialize`] if the body is not an order list or
    ///   the first order is malformed. Later orders on the page are not parsed.
    pub async fn fetch_first_order(
        &self,
        token: &AccessToken,
        query: &OrderQuery,
    ) -> Result<Option<Order>, MarketplaceError> {
        let signed = self.signer.headers(token)?;
        let limit = query.limit.to_string();
        let start = query
            .created_start_date
            .map(|d| d.format("%Y-%m-%d").to_string());
        let mut params = vec![("limit", limit.as_str())];
        if let Some(start) = &start {
            params.push(("createdStartDate", start.as_str()));
        }
        let url = self.endpoint_with_query(&["orders", "released"], &params)?;

        tracing::info!(
            limit = query.limit,
            created_start_date = start.as_deref(),
            correlation_id = %signed.correlation_id,
            "fetching released orders"
        );

        let response = self
            .client
            .get(url)
            .headers(signed.headers)
            .send()
            .await?;
        let status = response.status();
        if !is_accepted(status) {
            let body = read_body(response).await;
            return Err(MarketplaceError::OrderOperation {
                operation: "fetch orders",
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: OrdersResponse = decode(&body, "released orders")?;
        let Some(first) = parsed.list.elements.order.into_iter().next() else {
            tracing::info!("no released orders");
            return Ok(None);
        };
        let order: Order =
            serde_json::from_value(first).map_err(|source| MarketplaceError::Deserialize {
                context: "first released order".to_string(),
                source,
            })?;
        tracing::info!(
            purchase_order_id = %order.purchase_order_id,
            customer_order_id = order.customer_order_id.as_deref(),
            "order found"
        );
        Ok(Some(order))
    }

    /// Marks one order line shipped with the given tracking details.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if `token` is empty.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::OrderOperation`] on any status other than 200/201.
    pub async fn fulfill_order(
        &self,
        token: &AccessToken,
        purchase_order_id: &str,
        line: &OrderLine,
        tracking: &TrackingInfo,
    ) -> Result<(), MarketplaceError> {
        self.post_shipment(token, "fulfill order", purchase_order_id, line, tracking)
            .await
    }

    /// Re-sends the shipped line with updated tracking details.
    ///
    /// # Errors
    ///
    /// Same as [`fulfill_order`](Self::fulfill_order).
    pub async fn update_tracking(
        &self,
        token: &AccessToken,
        purchase_order_id: &str,
        line: &OrderLine,
        tracking: &TrackingInfo,
    ) -> Result<(), MarketplaceError> {
        self.post_shipment(token, "update tracking", purchase_order_id, line, tracking)
            .await
    }

    async fn post_shipment(
        &self,
        token: &AccessToken,
        operation: &'static str,
        purchase_order_id: &str,
        line: &OrderLine,
        tracking: &TrackingInfo,
    ) -> Result<(), MarketplaceError> {
        let signed = self.signer.headers(token)?;
        let url = self.endpoint(&["orders", purchase_order_id, "shipping"])?;
        let request = ShipmentRequest::shipped(line, tracking);

        tracing::info!(
            operation,
            purchase_order_id,
            line_number = %line.line_number,
            tracking_number = %tracking.tracking_number,
            correlation_id = %signed.correlation_id,
            "posting shipment update"
        );

        let response = self
            .client
            .post(url)
            .headers(signed.headers)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !is_accepted(status) {
            let body = read_body(response).await;
            tracing::warn!(
                operation,
                purchase_order_id,
                status = status.as_u16(),
                "shipment update rejected"
            );
            return Err(MarketplaceError::OrderOperation {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

fn is_accepted(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::OK || status == reqwest::StatusCode::CREATED
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn line() -> OrderLine {
        serde_json::from_value(serde_json::json!({
            "lineNumber": "1",
            "orderLineQuantity": { "unitOfMeasurement": "EACH", "amount": "1" }
        }))
        .unwrap()
    }

    #[test]
    fn shipped_request_nests_tracking_under_line_status() {
        let shipped_at = Utc.with_ymd_and_hms(2024, 10, 20, 1, 0, 0).unwrap();
        let tracking = TrackingInfo::placeholder("1Z999999999999999", shipped_at);
        let json = serde_json::to_value(ShipmentRequest::shipped(&line(), &tracking)).unwrap();

        let order_line = &json["orderShipment"]["orderLines"]["orderLine"][0];
        assert_eq!(order_line["lineNumber"], "1");
        let status = &order_line["orderLineStatuses"]["orderLineStatus"][0];
        assert_eq!(status["status"], "Shipped");
        assert_eq!(status["statusQuantity"]["unitOfMeasurement"], "EACH");
        assert_eq!(status["statusQuantity"]["amount"], "1");
        let info = &status["trackingInfo"];
        assert_eq!(info["carrierName"]["carrier"], "UPS");
        assert_eq!(info["methodCode"], "Standard");
        assert_eq!(info["trackingNumber"], "1Z999999999999999");
        assert_eq!(info["shipDateTime"], 1_729_386_000_000_i64);
        assert!(info.get("trackingURL").is_none());
    }

    #[test]
    fn tracking_url_is_sent_when_present() {
        let mut tracking = TrackingInfo::placeholder("1Z1", Utc::now());
        tracking.tracking_url = Some("https://track.example/1Z1".to_string());
        let json = serde_json::to_value(ShipmentRequest::shipped(&line(), &tracking)).unwrap();
        assert_eq!(
            json["orderShipment"]["orderLines"]["orderLine"][0]["orderLineStatuses"]
                ["orderLineStatus"][0]["trackingInfo"]["trackingURL"],
            "https://track.example/1Z1"
        );
    }

    #[test]
    fn default_query_limit_is_ten() {
        let q = OrderQuery::default();
        assert_eq!(q.limit, 10);
        assert!(q.created_start_date.is_none());
    }
}
