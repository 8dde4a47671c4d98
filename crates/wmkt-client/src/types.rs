//! Marketplace API wire types.
//!
//! Response types are deliberately lenient: most fields carry
//! `#[serde(default)]` because the marketplace omits empty collections and
//! optional metadata rather than sending `null`. Request payloads live next
//! to the operations that send them (`feeds.rs`, `orders.rs`).

use serde::{Deserialize, Serialize};

/// The two asynchronous write feeds this client submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Item,
    Inventory,
}

impl FeedKind {
    /// Value of the `feedType` query parameter.
    #[must_use]
    pub fn as_query(self) -> &'static str {
        match self {
            FeedKind::Item => "item",
            FeedKind::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Server-assigned identifier of an accepted feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedId(String);

impl FeedId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// token
// ---------------------------------------------------------------------------

/// Body of a successful credential-grant exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until expiry. Logged only; tokens are never renewed.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

// ---------------------------------------------------------------------------
// feeds
// ---------------------------------------------------------------------------

/// Acknowledgement returned by `POST /feeds`.
#[derive(Debug, Deserialize)]
pub struct FeedAck {
    #[serde(rename = "feedId", default)]
    pub feed_id: Option<String>,
}

/// Body of `GET /feeds/{feedId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatusResponse {
    pub feed_status: String,
    #[serde(default)]
    pub items_received: u64,
    #[serde(default)]
    pub items_succeeded: u64,
    #[serde(default)]
    pub items_failed: u64,
}

/// Processing state of a feed.
///
/// `PROCESSED` and `ERROR` are terminal. Every other value the marketplace
/// reports (`RECEIVED`, `INPROGRESS`, `PENDING`, ...) is kept verbatim as
/// [`FeedStatus::Pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Pending(String),
    Processed,
    Error,
}

impl FeedStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PROCESSED" => FeedStatus::Processed,
            "ERROR" => FeedStatus::Error,
            _ => FeedStatus::Pending(raw.to_string()),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FeedStatus::Pending(_))
    }
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedStatus::Pending(raw) => f.write_str(raw),
            FeedStatus::Processed => f.write_str("PROCESSED"),
            FeedStatus::Error => f.write_str("ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// items / inventory
// ---------------------------------------------------------------------------

/// A quantity that the marketplace sends either as a JSON number or as a
/// numeric string (`100` vs `"100"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// The amount as an exact integer, or `None` for fractional or
    /// non-numeric values.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Amount::Number(n) => n.as_i64(),
            Amount::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// Body of `GET /inventory?sku=`.
#[derive(Debug, Deserialize)]
pub struct InventoryResponse {
    #[serde(default)]
    pub quantity: Option<InventoryQuantity>,
}

#[derive(Debug, Deserialize)]
pub struct InventoryQuantity {
    pub amount: Amount,
}

// ---------------------------------------------------------------------------
// orders
// ---------------------------------------------------------------------------

/// Body of `GET /orders/released`: orders nest under `list.elements.order[]`.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub list: OrderList,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub elements: OrderElements,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderElements {
    /// Kept as raw JSON so only the order actually used has to be well formed.
    #[serde(default)]
    pub order: Vec<serde_json::Value>,
}

/// A released purchase order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub purchase_order_id: String,
    #[serde(default)]
    pub customer_order_id: Option<String>,
    #[serde(default)]
    pub order_lines: OrderLines,
}

impl Order {
    /// First line of the order, the one a seller run ships.
    #[must_use]
    pub fn first_line(&self) -> Option<&OrderLine> {
        self.order_lines.order_line.first()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLines {
    #[serde(default)]
    pub order_line: Vec<OrderLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub line_number: String,
    #[serde(default)]
    pub order_line_quantity: Option<LineQuantity>,
}

impl OrderLine {
    /// Requested quantity; a line without a readable positive quantity counts
    /// as one unit.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.order_line_quantity
            .as_ref()
            .and_then(|q| q.amount.as_integer())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineQuantity {
    pub amount: Amount,
}
