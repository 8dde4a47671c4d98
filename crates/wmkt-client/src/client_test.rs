use super::*;

fn test_client(base_url: &str) -> MarketplaceClient {
    MarketplaceClient::with_urls(
        Credentials::new("client-id", "client-secret"),
        "https://marketplace.walmartapis.com/v3/token",
        base_url,
        &ClientOptions::default(),
    )
    .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_segments_to_base_path() {
    let client = test_client("https://marketplace.walmartapis.com/v3");
    let url = client.endpoint(&["feeds", "F1"]).unwrap();
    assert_eq!(url.as_str(), "https://marketplace.walmartapis.com/v3/feeds/F1");
}

#[test]
fn endpoint_strips_trailing_slash() {
    let client = test_client("https://marketplace.walmartapis.com/v3/");
    let url = client.endpoint(&["orders", "released"]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://marketplace.walmartapis.com/v3/orders/released"
    );
}

#[test]
fn endpoint_encodes_path_segments() {
    let client = test_client("https://marketplace.walmartapis.com/v3");
    let url = client.endpoint(&["items", "SKU/WITH SPACE"]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://marketplace.walmartapis.com/v3/items/SKU%2FWITH%20SPACE"
    );
}

#[test]
fn endpoint_with_query_encodes_values() {
    let client = test_client("https://marketplace.walmartapis.com/v3");
    let url = client
        .endpoint_with_query(&["feeds"], &[("feedType", "inventory")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://marketplace.walmartapis.com/v3/feeds?feedType=inventory"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = MarketplaceClient::with_urls(
        Credentials::new("id", "secret"),
        "https://marketplace.walmartapis.com/v3/token",
        "not a url",
        &ClientOptions::default(),
    );
    assert!(matches!(result, Err(MarketplaceError::InvalidUrl { .. })));
}

#[test]
fn invalid_service_name_is_rejected() {
    let options = ClientOptions {
        service_name: "bad\nname".to_string(),
        ..ClientOptions::default()
    };
    let result = MarketplaceClient::with_urls(
        Credentials::new("id", "secret"),
        "https://marketplace.walmartapis.com/v3/token",
        "https://marketplace.walmartapis.com/v3",
        &options,
    );
    assert!(matches!(result, Err(MarketplaceError::InvalidState(_))));
}
