//! Command handlers for the CLI.
//!
//! Marketplace failures are printed in the run report rather than
//! propagated. Only a listing file that cannot be loaded is an error.

use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use wmkt_client::{
    run_listing_sequence, run_order_sequence, run_seller_sequence, MarketplaceClient, OrderQuery,
    PollPolicy, RunOptions, RunReport,
};
use wmkt_core::{AppConfig, ItemListing};

pub(crate) struct OrderArgs {
    pub created_start_date: Option<NaiveDate>,
    pub tracking_number: String,
    pub dry_run: bool,
}

pub(crate) async fn run_token(client: &MarketplaceClient) {
    match client.fetch_token().await {
        Ok(_) => println!("[ok]   fetch token: access token acquired"),
        Err(e) => println!("[fail] fetch token: {e}"),
    }
}

/// # Errors
///
/// Returns an error if the listing file cannot be read or fails validation.
pub(crate) async fn run_list(
    client: &MarketplaceClient,
    config: &AppConfig,
    no_wait: bool,
) -> anyhow::Result<()> {
    let listing = load_listing(config)?;
    let options = RunOptions {
        await_feeds: !no_wait,
        ..run_options(config)
    };
    let report = run_listing_sequence(client, &listing, &options).await;
    print_report(&report);
    Ok(())
}

pub(crate) async fn run_orders(client: &MarketplaceClient, config: &AppConfig, args: OrderArgs) {
    let start = args
        .created_start_date
        .unwrap_or_else(|| first_of_month(Utc::now().date_naive()));
    let options = RunOptions {
        order_query: OrderQuery {
            created_start_date: Some(start),
            ..OrderQuery::default()
        },
        tracking_number: args.tracking_number,
        ship_orders: !args.dry_run,
        ..run_options(config)
    };
    let report = run_order_sequence(client, &options).await;
    print_report(&report);
}

/// # Errors
///
/// Returns an error if the listing file cannot be read or fails validation.
pub(crate) async fn run_all(
    client: &MarketplaceClient,
    config: &AppConfig,
    no_wait: bool,
    tracking_number: String,
) -> anyhow::Result<()> {
    let listing = load_listing(config)?;
    let options = RunOptions {
        await_feeds: !no_wait,
        order_query: OrderQuery {
            created_start_date: Some(first_of_month(Utc::now().date_naive())),
            ..OrderQuery::default()
        },
        tracking_number,
        ..run_options(config)
    };
    let report = run_seller_sequence(client, &listing, &options).await;
    print_report(&report);
    Ok(())
}

/// Options shared by every command, taken from configuration.
pub(crate) fn run_options(config: &AppConfig) -> RunOptions {
    RunOptions {
        poll_policy: PollPolicy::fixed(
            config.feed_poll_max_attempts,
            Duration::from_secs(config.feed_poll_interval_secs),
        ),
        ..RunOptions::default()
    }
}

pub(crate) fn first_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn load_listing(config: &AppConfig) -> anyhow::Result<ItemListing> {
    let file = wmkt_core::load_listing(&config.listing_path).with_context(|| {
        format!(
            "failed to load listing from {}",
            config.listing_path.display()
        )
    })?;
    tracing::info!(sku = %file.listing.sku, "listing loaded");
    Ok(file.listing)
}

fn print_report(report: &RunReport) {
    print!("{report}");
    if !report.is_clean() {
        tracing::warn!("run finished with failed steps");
    }
}
