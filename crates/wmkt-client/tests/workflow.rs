//! End-to-end seller runs against a wiremock marketplace.

use rust_decimal::Decimal;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wmkt_client::{
    run_listing_sequence, run_order_sequence, run_seller_sequence, ClientOptions,
    MarketplaceClient, PollPolicy, RunOptions, Step, StepStatus,
};
use wmkt_core::{Credentials, ItemListing};

const SKU: &str = "LGHTRK-SET-3";

fn listing() -> ItemListing {
    ItemListing {
        sku: SKU.to_string(),
        title: "Lightlark Series Set".to_string(),
        isbn: "9781637996478".to_string(),
        price: Decimal::new(2999, 2),
        description: "Three-book set.".to_string(),
        brand: "Alex Aster".to_string(),
        publisher: "generic".to_string(),
        image_url: "https://images.example/lightlark.jpg".to_string(),
        key_features: vec!["Hardcover".to_string()],
        shipping_weight_lb: Some(Decimal::ONE),
        quantity: 100,
    }
}

fn options() -> RunOptions {
    RunOptions {
        poll_policy: PollPolicy::immediate(5),
        ..RunOptions::default()
    }
}

fn test_client(server: &MockServer) -> MarketplaceClient {
    MarketplaceClient::with_urls(
        Credentials::new("client-id", "client-secret"),
        &format!("{}/v3/token", server.uri()),
        &format!("{}/v3", server.uri()),
        &ClientOptions::default(),
    )
    .expect("client construction should not fail")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v3/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "run-token",
            "token_type": "Bearer",
            "expires_in": 900
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_feeds(server: &MockServer, inventory_amount: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v3/feeds"))
        .and(query_param("feedType", "item"))
        .and(body_partial_json(serde_json::json!({
            "MPItemFeedHeader": { "version": "4.8", "processMode": "REPLACE" },
            "MPItem": [{
                "Orderable": {
                    "sku": SKU,
                    "productIdentifiers": { "productIdType": "ISBN", "productId": "9781637996478" },
                    "price": 29.99
                },
                "Visible": { "Books": { "publisher": "generic" } }
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "feedId": "F-ITEM" })),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/feeds"))
        .and(query_param("feedType", "inventory"))
        .and(body_partial_json(serde_json::json!({
            "Inventory": [{ "sku": SKU, "quantity": { "unit": "EACH", "amount": 100 } }]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "feedId": "F-INV" })),
        )
        .expect(1)
        .mount(server)
        .await;

    for feed in ["F-ITEM", "F-INV"] {
        Mock::given(method("GET"))
            .and(path(format!("/v3/feeds/{feed}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "feedId": feed,
                "feedStatus": "PROCESSED",
                "itemsReceived": 1,
                "itemsSucceeded": 1,
                "itemsFailed": 0
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(format!("/v3/items/{SKU}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sku": SKU })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/inventory"))
        .and(query_param("sku", SKU))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sku": SKU,
            "quantity": { "unit": "EACH", "amount": inventory_amount }
        })))
        .mount(server)
        .await;
}

async fn mount_order(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/orders/released"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": { "elements": { "order": [{
                "purchaseOrderId": "TEST-ORDER-123",
                "orderLines": { "orderLine": [{
                    "lineNumber": "1",
                    "orderLineQuantity": { "unitOfMeasurement": "EACH", "amount": "1" }
                }] }
            }] } }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn shipment_body() -> serde_json::Value {
    serde_json::json!({
        "orderShipment": { "orderLines": { "orderLine": [{
            "lineNumber": "1",
            "orderLineStatuses": { "orderLineStatus": [{
                "status": "Shipped",
                "statusQuantity": { "unitOfMeasurement": "EACH", "amount": "1" },
                "trackingInfo": {
                    "carrierName": { "carrier": "UPS" },
                    "methodCode": "Standard",
                    "trackingNumber": "1Z999999999999999"
                }
            }] }
        }] } }
    })
}

fn is_skipped(status: Option<&StepStatus>) -> bool {
    matches!(status, Some(StepStatus::Skipped(_)))
}

fn is_failed(status: Option<&StepStatus>) -> bool {
    matches!(status, Some(StepStatus::Failed(_)))
}

#[tokio::test]
async fn full_run_lists_stocks_and_ships() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_feeds(&server, serde_json::json!(100)).await;
    mount_order(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/orders/TEST-ORDER-123/shipping"))
        .and(body_partial_json(shipment_body()))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let report = run_seller_sequence(&test_client(&server), &listing(), &options()).await;

    let steps: Vec<Step> = report.steps.iter().map(|o| o.step).collect();
    assert_eq!(
        steps,
        vec![
            Step::FetchToken,
            Step::ListItem,
            Step::UpdateInventory,
            Step::FetchOrder,
            Step::FulfillOrder,
            Step::UpdateTracking,
        ]
    );
    assert!(report.is_clean(), "unexpected failures:\n{report}");
    assert!(report.steps.iter().all(|o| matches!(o.status, StepStatus::Succeeded(_))));
}

#[tokio::test]
async fn token_failure_skips_everything() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_seller_sequence(&test_client(&server), &listing(), &options()).await;

    assert!(is_failed(report.status_of(Step::FetchToken)));
    for step in [
        Step::ListItem,
        Step::UpdateInventory,
        Step::FetchOrder,
        Step::FulfillOrder,
        Step::UpdateTracking,
    ] {
        assert!(is_skipped(report.status_of(step)), "{step} should be skipped");
    }
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn item_feed_failure_stops_the_run() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/feeds"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid item"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = run_seller_sequence(&test_client(&server), &listing(), &options()).await;

    assert!(is_failed(report.status_of(Step::ListItem)));
    assert!(is_skipped(report.status_of(Step::UpdateInventory)));
    assert!(is_skipped(report.status_of(Step::FetchOrder)));
}

#[tokio::test]
async fn inventory_mismatch_does_not_block_orders() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_feeds(&server, serde_json::json!(99)).await;
    mount_order(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/orders/TEST-ORDER-123/shipping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let report = run_seller_sequence(&test_client(&server), &listing(), &options()).await;

    assert!(report.succeeded(Step::ListItem));
    match report.status_of(Step::UpdateInventory) {
        Some(StepStatus::Failed(reason)) => assert!(reason.contains("quantity 100"), "{reason}"),
        other => panic!("expected inventory failure, got {other:?}"),
    }
    assert!(report.succeeded(Step::FulfillOrder));
    assert!(report.succeeded(Step::UpdateTracking));
}

#[tokio::test]
async fn no_released_orders_skips_shipment() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v3/orders/released"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": { "elements": { "order": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/orders/TEST-ORDER-123/shipping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = run_order_sequence(&test_client(&server), &options()).await;

    assert!(report.succeeded(Step::FetchOrder));
    assert!(is_skipped(report.status_of(Step::FulfillOrder)));
    assert!(is_skipped(report.status_of(Step::UpdateTracking)));
}

#[tokio::test]
async fn fulfillment_failure_skips_tracking() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_order(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/orders/TEST-ORDER-123/shipping"))
        .respond_with(ResponseTemplate::new(500).set_body_string("downstream error"))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_order_sequence(&test_client(&server), &options()).await;

    assert!(is_failed(report.status_of(Step::FulfillOrder)));
    assert!(is_skipped(report.status_of(Step::UpdateTracking)));
    assert!(!report.is_clean());
}

#[tokio::test]
async fn dry_run_looks_up_order_without_shipping() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_order(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/orders/TEST-ORDER-123/shipping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let run = RunOptions {
        ship_orders: false,
        ..options()
    };
    let report = run_order_sequence(&test_client(&server), &run).await;

    assert!(report.succeeded(Step::FetchOrder));
    assert_eq!(
        report.status_of(Step::FulfillOrder),
        Some(&StepStatus::Skipped("dry run".to_string()))
    );
}

#[tokio::test]
async fn listing_without_waiting_skips_polling() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/feeds"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "feedId": "F1" })),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let run = RunOptions {
        await_feeds: false,
        ..options()
    };
    let report = run_listing_sequence(&test_client(&server), &listing(), &run).await;

    assert!(report.succeeded(Step::ListItem));
    assert!(report.succeeded(Step::UpdateInventory));
    assert!(report.status_of(Step::FetchOrder).is_none());
}

#[tokio::test]
async fn item_feed_timeout_fails_listing() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/v3/feeds"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "feedId": "F-ITEM" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/feeds/F-ITEM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "feedId": "F-ITEM",
            "feedStatus": "INPROGRESS"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let run = RunOptions {
        poll_policy: PollPolicy::immediate(3),
        ..RunOptions::default()
    };
    let report = run_listing_sequence(&test_client(&server), &listing(), &run).await;

    match report.status_of(Step::ListItem) {
        Some(StepStatus::Failed(reason)) => assert!(reason.contains("pending after 3"), "{reason}"),
        other => panic!("expected listing failure, got {other:?}"),
    }
    assert!(is_skipped(report.status_of(Step::UpdateInventory)));
}
