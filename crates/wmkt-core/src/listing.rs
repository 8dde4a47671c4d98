use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The product a seller run lists and stocks.
///
/// Loaded from `config/listing.yaml`; the client crate turns it into an item
/// feed and an inventory feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListing {
    pub sku: String,
    pub title: String,
    /// 13-digit ISBN, sent as the product identifier.
    pub isbn: String,
    pub price: Decimal,
    pub description: String,
    pub brand: String,
    #[serde(default = "default_publisher")]
    pub publisher: String,
    pub image_url: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub shipping_weight_lb: Option<Decimal>,
    /// Units to report in the inventory feed.
    pub quantity: u32,
}

fn default_publisher() -> String {
    "generic".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ListingFile {
    pub listing: ItemListing,
}

/// Load and validate the listing from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_listing(path: &Path) -> Result<ListingFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ListingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_listing(&content)
}

fn parse_listing(content: &str) -> Result<ListingFile, ConfigError> {
    let listing_file: ListingFile = serde_yaml::from_str(content)?;
    validate_listing(&listing_file.listing)?;
    Ok(listing_file)
}

fn validate_listing(listing: &ItemListing) -> Result<(), ConfigError> {
    if listing.sku.trim().is_empty() {
        return Err(ConfigError::Validation("sku must be non-empty".to_string()));
    }

    if listing.title.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "listing '{}' has an empty title",
            listing.sku
        )));
    }

    if listing.price <= Decimal::ZERO {
        return Err(ConfigError::Validation(format!(
            "listing '{}' has non-positive price {}",
            listing.sku, listing.price
        )));
    }

    if listing.quantity == 0 {
        return Err(ConfigError::Validation(format!(
            "listing '{}' must stock at least one unit",
            listing.sku
        )));
    }

    if !listing.isbn.chars().all(|c| c.is_ascii_digit()) || listing.isbn.len() != 13 {
        return Err(ConfigError::Validation(format!(
            "listing '{}' has invalid ISBN '{}'; expected 13 digits",
            listing.sku, listing.isbn
        )));
    }

    Ok(())
}
