//! The seller run: list a product, stock it, then ship the first released
//! order.
//!
//! Every step is recorded in a [`RunReport`]. A failed step never aborts
//! the process; it causes the steps that depend on it to be recorded as
//! skipped:
//!
//! | Step failed        | Skipped                               |
//! |--------------------|---------------------------------------|
//! | token              | everything                            |
//! | item listing       | inventory, order, fulfilment, tracking |
//! | inventory          | nothing                               |
//! | order lookup/none  | fulfilment, tracking                  |
//! | fulfilment         | tracking                              |

use chrono::Utc;
use wmkt_core::ItemListing;

use crate::auth::AccessToken;
use crate::client::MarketplaceClient;
use crate::error::MarketplaceError;
use crate::feeds::FeedPayload;
use crate::orders::{OrderQuery, TrackingInfo};
use crate::poll::PollPolicy;

pub const PLACEHOLDER_TRACKING_NUMBER: &str = "1Z999999999999999";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchToken,
    ListItem,
    UpdateInventory,
    FetchOrder,
    FulfillOrder,
    UpdateTracking,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::FetchToken => "fetch token",
            Step::ListItem => "list item",
            Step::UpdateInventory => "update inventory",
            Step::FetchOrder => "fetch order",
            Step::FulfillOrder => "fulfill order",
            Step::UpdateTracking => "update tracking",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded(String),
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub status: StepStatus,
}

/// Ordered record of what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: Vec<StepOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn status_of(&self, step: Step) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|o| o.step == step)
            .map(|o| &o.status)
    }

    #[must_use]
    pub fn succeeded(&self, step: Step) -> bool {
        matches!(self.status_of(step), Some(StepStatus::Succeeded(_)))
    }

    /// `true` if no recorded step failed. Skipped steps do not count as failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|o| matches!(o.status, StepStatus::Failed(_)))
    }

    fn record(&mut self, step: Step, status: StepStatus) {
        match &status {
            StepStatus::Succeeded(detail) => tracing::info!(%step, detail, "step succeeded"),
            StepStatus::Failed(reason) => tracing::warn!(%step, reason, "step failed"),
            StepStatus::Skipped(reason) => tracing::info!(%step, reason, "step skipped"),
        }
        self.steps.push(StepOutcome { step, status });
    }

    fn skip(&mut self, steps: &[Step], reason: &str) {
        for step in steps {
            self.record(*step, StepStatus::Skipped(reason.to_string()));
        }
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for outcome in &self.steps {
            match &outcome.status {
                StepStatus::Succeeded(detail) => writeln!(f, "[ok]   {}: {detail}", outcome.step)?,
                StepStatus::Failed(reason) => writeln!(f, "[fail] {}: {reason}", outcome.step)?,
                StepStatus::Skipped(reason) => writeln!(f, "[skip] {}: {reason}", outcome.step)?,
            }
        }
        Ok(())
    }
}

/// Knobs for a seller run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Poll each feed and read its effect back before calling the step done.
    /// When `false`, an accepted submission counts as success.
    pub await_feeds: bool,
    pub poll_policy: PollPolicy,
    pub order_query: OrderQuery,
    pub tracking_number: String,
    /// When `false`, the order is looked up but not shipped.
    pub ship_orders: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            await_feeds: true,
            poll_policy: PollPolicy::default(),
            order_query: OrderQuery::default(),
            tracking_number: PLACEHOLDER_TRACKING_NUMBER.to_string(),
            ship_orders: true,
        }
    }
}

/// Token, listing, inventory, then order shipment.
pub async fn run_seller_sequence(
    client: &MarketplaceClient,
    listing: &ItemListing,
    options: &RunOptions,
) -> RunReport {
    let mut run = SellerRun::new(client, options);
    let Some(token) = run.authenticate().await else {
        run.report.skip(
            &[
                Step::ListItem,
                Step::UpdateInventory,
                Step::FetchOrder,
                Step::FulfillOrder,
                Step::UpdateTracking,
            ],
            "no access token",
        );
        return run.report;
    };

    if !run.list_item(&token, listing).await {
        run.report.skip(
            &[
                Step::UpdateInventory,
                Step::FetchOrder,
                Step::FulfillOrder,
                Step::UpdateTracking,
            ],
            "item listing failed",
        );
        return run.report;
    }

    run.update_inventory(&token, listing).await;
    run.ship_first_order(&token).await;
    run.report
}

/// Token, listing, inventory.
pub async fn run_listing_sequence(
    client: &MarketplaceClient,
    listing: &ItemListing,
    options: &RunOptions,
) -> RunReport {
    let mut run = SellerRun::new(client, options);
    let Some(token) = run.authenticate().await else {
        run.report.skip(&[Step::ListItem, Step::UpdateInventory], "no access token");
        return run.report;
    };

    if run.list_item(&token, listing).await {
        run.update_inventory(&token, listing).await;
    } else {
        run.report.skip(&[Step::UpdateInventory], "item listing failed");
    }
    run.report
}

/// Token, then order lookup and shipment.
pub async fn run_order_sequence(client: &MarketplaceClient, options: &RunOptions) -> RunReport {
    let mut run = SellerRun::new(client, options);
    let Some(token) = run.authenticate().await else {
        run.report.skip(
            &[Step::FetchOrder, Step::FulfillOrder, Step::UpdateTracking],
            "no access token",
        );
        return run.report;
    };
    run.ship_first_order(&token).await;
    run.report
}

/// What to read back after a feed is processed.
enum Expectation {
    Listed,
    Quantity(u32),
}

struct SellerRun<'a> {
    client: &'a MarketplaceClient,
    options: &'a RunOptions,
    report: RunReport,
}

impl<'a> SellerRun<'a> {
    fn new(client: &'a MarketplaceClient, options: &'a RunOptions) -> Self {
        Self {
            client,
            options,
            report: RunReport::default(),
        }
    }

    async fn authenticate(&mut self) -> Option<AccessToken> {
        match self.client.fetch_token().await {
            Ok(token) => {
                self.report.record(
                    Step::FetchToken,
                    StepStatus::Succeeded("access token acquired".to_string()),
                );
                Some(token)
            }
            Err(err) => {
                self.report
                    .record(Step::FetchToken, StepStatus::Failed(err.to_string()));
                None
            }
        }
    }

    async fn list_item(&mut self, token: &AccessToken, listing: &ItemListing) -> bool {
        let payload = FeedPayload::item(listing);
        let result = self
            .apply_feed(token, &payload, &listing.sku, Expectation::Listed)
            .await;
        self.finish(Step::ListItem, result)
    }

    async fn update_inventory(&mut self, token: &AccessToken, listing: &ItemListing) -> bool {
        let payload = FeedPayload::inventory(&listing.sku, listing.quantity);
        let result = self
            .apply_feed(
                token,
                &payload,
                &listing.sku,
                Expectation::Quantity(listing.quantity),
            )
            .await;
        self.finish(Step::UpdateInventory, result)
    }

    /// Submit, then (when awaiting feeds) poll and read the effect back.
    async fn apply_feed(
        &self,
        token: &AccessToken,
        payload: &FeedPayload,
        sku: &str,
        expectation: Expectation,
    ) -> Result<String, MarketplaceError> {
        let feed_id = self.client.submit_feed(token, payload).await?;
        if !self.options.await_feeds {
            return Ok(format!("feed {feed_id} accepted"));
        }

        let outcome = self
            .client
            .poll_feed(token, &feed_id, &self.options.poll_policy)
            .await?;
        let items = outcome.into_result(&feed_id)?;

        let (confirmed, expected) = match expectation {
            Expectation::Listed => (
                self.client.verify_item_listed(token, sku).await,
                "item to be listed".to_string(),
            ),
            Expectation::Quantity(amount) => (
                self.client
                    .verify_inventory_quantity(token, sku, amount)
                    .await,
                format!("quantity {amount}"),
            ),
        };
        if !confirmed {
            return Err(MarketplaceError::VerificationMismatch {
                sku: sku.to_string(),
                expected,
            });
        }

        Ok(format!("feed {feed_id} processed ({items} succeeded) and verified"))
    }

    async fn ship_first_order(&mut self, token: &AccessToken) {
        let order = match self
            .client
            .fetch_first_order(token, &self.options.order_query)
            .await
        {
            Ok(Some(order)) => order,
            Ok(None) => {
                self.report.record(
                    Step::FetchOrder,
                    StepStatus::Succeeded("no released orders".to_string()),
                );
                self.report.skip(
                    &[Step::FulfillOrder, Step::UpdateTracking],
                    "no order to ship",
                );
                return;
            }
            Err(err) => {
                self.report
                    .record(Step::FetchOrder, StepStatus::Failed(err.to_string()));
                self.report.skip(
                    &[Step::FulfillOrder, Step::UpdateTracking],
                    "order lookup failed",
                );
                return;
            }
        };

        self.report.record(
            Step::FetchOrder,
            StepStatus::Succeeded(format!("order {}", order.purchase_order_id)),
        );

        if !self.options.ship_orders {
            self.report.skip(&[Step::FulfillOrder, Step::UpdateTracking], "dry run");
            return;
        }

        let Some(line) = order.first_line() else {
            self.report.skip(
                &[Step::FulfillOrder, Step::UpdateTracking],
                "order has no lines",
            );
            return;
        };

        let tracking = TrackingInfo::placeholder(self.options.tracking_number.clone(), Utc::now());
        let po = order.purchase_order_id.as_str();

        let fulfilled = self
            .client
            .fulfill_order(token, po, line, &tracking)
            .await
            .map(|()| format!("order {po} line {} shipped", line.line_number));
        if !self.finish(Step::FulfillOrder, fulfilled) {
            self.report.skip(&[Step::UpdateTracking], "fulfillment failed");
            return;
        }

        let tracked = self
            .client
            .update_tracking(token, po, line, &tracking)
            .await
            .map(|()| format!("tracking {} attached", tracking.tracking_number));
        self.finish(Step::UpdateTracking, tracked);
    }

    fn finish(&mut self, step: Step, result: Result<String, MarketplaceError>) -> bool {
        match result {
            Ok(detail) => {
                self.report.record(step, StepStatus::Succeeded(detail));
                true
            }
            Err(err) => {
                self.report.record(step, StepStatus::Failed(err.to_string()));
                false
            }
        }
    }
}
