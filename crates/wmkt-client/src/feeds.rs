//! Feed payloads and submission.
//!
//! Two payload shapes are supported, each with a fixed version tag:
//!
//! | Feed        | Header              | Version | Items       |
//! |-------------|---------------------|---------|-------------|
//! | `item`      | `MPItemFeedHeader`  | `4.8`   | `MPItem[]`  |
//! | `inventory` | `InventoryHeader`   | `1.4`   | `Inventory[]` |

use rust_decimal::Decimal;
use serde::Serialize;
use wmkt_core::ItemListing;

use crate::auth::AccessToken;
use crate::client::{decode, read_body, MarketplaceClient};
use crate::error::MarketplaceError;
use crate::types::{FeedAck, FeedId, FeedKind};

pub const ITEM_FEED_VERSION: &str = "4.8";
pub const INVENTORY_FEED_VERSION: &str = "1.4";

/// A versioned feed body, ready to post.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FeedPayload {
    Item(ItemFeed),
    Inventory(InventoryFeed),
}

impl FeedPayload {
    /// Item feed listing one product.
    #[must_use]
    pub fn item(listing: &ItemListing) -> Self {
        FeedPayload::Item(ItemFeed {
            header: ItemFeedHeader {
                selling_channel: "marketplace",
                process_mode: "REPLACE",
                subset: "EXTERNAL",
                locale: "en",
                version: ITEM_FEED_VERSION,
            },
            items: vec![MpItem::from_listing(listing)],
        })
    }

    /// Inventory feed setting one SKU's on-hand quantity.
    #[must_use]
    pub fn inventory(sku: &str, amount: u32) -> Self {
        FeedPayload::Inventory(InventoryFeed {
            header: InventoryHeader {
                version: INVENTORY_FEED_VERSION,
            },
            inventory: vec![InventoryItem {
                sku: sku.to_string(),
                quantity: InventoryAmount {
                    unit: "EACH",
                    amount,
                },
            }],
        })
    }

    #[must_use]
    pub fn kind(&self) -> FeedKind {
        match self {
            FeedPayload::Item(_) => FeedKind::Item,
            FeedPayload::Inventory(_) => FeedKind::Inventory,
        }
    }

    /// SKU of the single item carried by the feed.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        match self {
            FeedPayload::Item(feed) => feed.items.first().map(|i| i.orderable.sku.as_str()),
            FeedPayload::Inventory(feed) => feed.inventory.first().map(|i| i.sku.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemFeed {
    #[serde(rename = "MPItemFeedHeader")]
    pub header: ItemFeedHeader,
    #[serde(rename = "MPItem")]
    pub items: Vec<MpItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFeedHeader {
    pub selling_channel: &'static str,
    pub process_mode: &'static str,
    pub subset: &'static str,
    pub locale: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MpItem {
    #[serde(rename = "Orderable")]
    pub orderable: Orderable,
    #[serde(rename = "Visible")]
    pub visible: Visible,
}

impl MpItem {
    fn from_listing(listing: &ItemListing) -> Self {
        Self {
            orderable: Orderable {
                sku: listing.sku.clone(),
                product_identifiers: ProductIdentifiers {
                    product_id_type: "ISBN",
                    product_id: listing.isbn.clone(),
                },
                product_name: listing.title.clone(),
                brand: listing.brand.clone(),
                price: listing.price,
                shipping_weight: listing.shipping_weight_lb,
            },
            visible: Visible {
                books: BookDetails {
                    short_description: listing.description.clone(),
                    main_image_url: listing.image_url.clone(),
                    key_features: listing.key_features.clone(),
                    publisher: listing.publisher.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orderable {
    pub sku: String,
    pub product_identifiers: ProductIdentifiers,
    pub product_name: String,
    pub brand: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        rename = "ShippingWeight",
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipping_weight: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdentifiers {
    pub product_id_type: &'static str,
    pub product_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visible {
    #[serde(rename = "Books")]
    pub books: BookDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub short_description: String,
    pub main_image_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    pub publisher: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryFeed {
    #[serde(rename = "InventoryHeader")]
    pub header: InventoryHeader,
    #[serde(rename = "Inventory")]
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryHeader {
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    pub sku: String,
    pub quantity: InventoryAmount,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryAmount {
    pub unit: &'static str,
    pub amount: u32,
}

impl MarketplaceClient {
    /// Posts a feed and returns the identifier the marketplace assigned to it.
    ///
    /// # Errors
    ///
    /// - [`MarketplaceError::InvalidState`] if `token` is empty.
    /// - [`MarketplaceError::Transport`] on network failure.
    /// - [`MarketplaceError::Submission`] on any status other than 200/201.
    /// - [`MarketplaceError::Deserialize`] if the acknowledgement is not JSON.
    /// - [`MarketplaceError::Decode`] if the acknowledgement has no `feedId`.
    pub async fn submit_feed(
        &self,
        token: &AccessToken,
        payload: &FeedPayload,
    ) -> Result<FeedId, MarketplaceError> {
        let kind = payload.kind();
        let signed = self.signer.headers(token)?;
        let url = self.endpoint_with_query(&["feeds"], &[("feedType", kind.as_query())])?;

        tracing::info!(
            feed_type = %kind,
            sku = payload.sku().unwrap_or_default(),
            correlation_id = %signed.correlation_id,
            "submitting feed"
        );

        let response = self
            .client
            .post(url)
            .headers(signed.headers)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            let body = read_body(response).await;
            tracing::warn!(feed_type = %kind, status = status.as_u16(), "feed submission rejected");
            return Err(MarketplaceError::Submission {
                kind,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let ack: FeedAck = decode(&body, format!("{kind} feed acknowledgement"))?;
        let feed_id = ack
            .feed_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| MarketplaceError::Decode {
                context: format!("{kind} feed acknowledgement"),
                reason: "feedId is missing".to_string(),
            })?;

        tracing::info!(feed_type = %kind, feed_id = %feed_id, "feed accepted");
        Ok(FeedId::new(feed_id))
    }
}
