//! End-to-end runs through the library facade: Shopify and the supplier feed
//! are served by `wiremock`, state and output live in a temp directory.

use std::fs;
use std::path::Path;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopsync::{AppConfig, SyncError, SyncMode};

const GRAPHQL_PATH: &str = "/admin/api/2024-01/graphql.json";

fn config(server: &MockServer, root: &Path) -> AppConfig {
    let mut cfg = AppConfig::from_toml("").unwrap();
    cfg.shopify.store_url = Some(server.uri());
    cfg.shopify.access_token = Some("shpat_test".into());
    cfg.shopify.location_id = Some("1".into());
    cfg.supplier.feed_url = Some(format!("{}/feed.csv", server.uri()));
    cfg.state.dir = root.join("state");
    cfg.state.sku_cache = root.join("state").join("shop_skus.json");
    cfg.output.dir = root.join("output");
    cfg
}

async fn mount_feed(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_graphql(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn inventory_levels(levels: &[(&str, i64)]) -> serde_json::Value {
    let edges: Vec<_> = levels
        .iter()
        .map(|(sku, qty)| {
            json!({ "node": {
                "quantities": [{ "name": "available", "quantity": qty }],
                "item": { "sku": sku, "variant": { "sku": sku, "price": "10.00" } }
            }})
        })
        .collect();
    json!({ "data": { "location": { "inventoryLevels": {
        "edges": edges,
        "pageInfo": { "hasNextPage": false, "endCursor": null }
    }}}})
}

#[tokio::test]
async fn live_inventory_run_writes_the_update_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_graphql(&server, inventory_levels(&[("A", 5), ("B", 10), ("C", 3)])).await;
    mount_feed(&server, "SKU,Stock\nA,5\nB,7\nD,2\n").await;

    let outcome = shopsync::run(&config(&server, dir.path()), SyncMode::Inventory, false)
        .await
        .unwrap();

    assert_eq!(outcome.reconciliation.differences.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("output/inventory_updates.csv")).unwrap(),
        "Variant SKU,Inventory Available: Shop location,Variant Command\nB,7,UPDATE\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("output/inventory_report.csv")).unwrap(),
        "sku,shopify_qty,vidaxl_qty,difference\nB,10,7,-3\n"
    );
    assert!(!dir.path().join("state").exists(), "live runs keep no baseline");
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_graphql(&server, inventory_levels(&[("A", 5)])).await;
    mount_feed(&server, "SKU,Stock\nA,1\n").await;

    let outcome = shopsync::run(&config(&server, dir.path()), SyncMode::Inventory, true)
        .await
        .unwrap();

    assert_eq!(outcome.reconciliation.differences.len(), 1);
    assert!(outcome.written.is_empty());
    assert!(!dir.path().join("output").exists());
}

#[tokio::test]
async fn price_delta_run_updates_file_and_baseline() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state");
    fs::create_dir_all(&state).unwrap();
    fs::write(state.join("last_prices.csv"), "SKU,Retail_Price\nA,79\nB,19\n").unwrap();
    fs::write(
        state.join("shop_skus.json"),
        r#"{ "skus": ["A", "B"], "count": 2, "updated": "2024-01-01T00:00:00Z" }"#,
    )
    .unwrap();
    // A: 56.25 * 1.6 = 90 -> 89; B unchanged at 19; X is not sold by the shop.
    mount_feed(&server, "SKU,Stock,B2B price\nA,1,56.25\nB,1,12.34\nX,1,500\n").await;

    let outcome = shopsync::run(&config(&server, dir.path()), SyncMode::Price, false)
        .await
        .unwrap();

    assert!(outcome.baseline_saved);
    assert_eq!(
        fs::read_to_string(dir.path().join("output/price_updates.csv")).unwrap(),
        "Variant SKU,Variant Price,Variant Command\nA,89,UPDATE\n"
    );
    assert_eq!(
        fs::read_to_string(state.join("last_prices.csv")).unwrap(),
        "SKU,Retail_Price\nA,89\nB,19\n"
    );
}

#[tokio::test]
async fn delta_run_without_sku_cache_fails_before_fetching() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("SKU,Stock\nA,1\n"))
        .expect(0)
        .mount(&server)
        .await;

    let err = shopsync::run(&config(&server, dir.path()), SyncMode::InventoryDelta, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::Configuration(_))
    ));
}

#[tokio::test]
async fn missing_credentials_fail_validation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&server, dir.path());
    cfg.shopify.access_token = None;

    let err = shopsync::run(&cfg, SyncMode::PriceLive, false).await.unwrap_err();

    assert!(err.to_string().contains("access_token"), "got: {err}");
}

#[tokio::test]
async fn refresh_skus_writes_the_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_graphql(
        &server,
        json!({ "data": { "productVariants": {
            "edges": [{ "node": { "sku": "B" } }, { "node": { "sku": "A" } }],
            "pageInfo": { "hasNextPage": false, "endCursor": null }
        }}}),
    )
    .await;

    let count = shopsync::refresh_sku_cache(&config(&server, dir.path())).await.unwrap();

    assert_eq!(count, 2);
    let cached: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("state/shop_skus.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(cached["skus"], json!(["A", "B"]));
}
