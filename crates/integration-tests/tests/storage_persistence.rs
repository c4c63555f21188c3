//! Slots written to a data directory survive a restart.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use axum::http::StatusCode;
use serde_json::json;

use inmind_integration_tests::{TestApp, checkout_form};
use inmind_storefront::config::StorageConfig;

async fn spawn_in(dir: &Path) -> TestApp {
    let dir = dir.to_path_buf();
    TestApp::spawn_with(move |config| config.storage = StorageConfig::Directory(dir)).await
}

#[tokio::test]
async fn test_accounts_orders_and_stock_survive_restart() {
    let data = tempfile::tempdir().unwrap();

    let order_id = {
        let app = spawn_in(data.path()).await;
        let mut client = app.client();
        client
            .post(
                "/api/auth/signup",
                json!({
                    "email": "jane@example.com",
                    "username": "janedoe",
                    "password": "hunter22",
                    "firstname": "Jane",
                    "lastname": "Doe",
                    "phone": "5551234567"
                }),
            )
            .await
            .assert_status(StatusCode::CREATED);
        client
            .post("/api/cart/items", json!({"product_id": 2, "quantity": 3}))
            .await
            .assert_status(StatusCode::OK);
        client
            .post("/api/cart/items", json!({"product_id": 5}))
            .await
            .assert_status(StatusCode::OK);
        let resp = client.post("/api/checkout", checkout_form()).await;
        resp.assert_status(StatusCode::CREATED);
        resp.body["order_id"].as_i64().unwrap()
    };

    assert!(data.path().join("orders_data.json").exists());

    // Sessions are in memory, so log in again on the new instance
    let app = spawn_in(data.path()).await;
    let mut client = app.client();
    client
        .login("jane@example.com", "hunter22", "user")
        .await
        .assert_status(StatusCode::OK);

    let orders = client.get("/api/orders").await;
    assert_eq!(orders.body[0]["id"], order_id);

    let inventory = app.admin_client().await.get("/api/admin/inventory").await;
    let stock = inventory
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == 2)
        .map(|i| i["current_stock"].as_u64().unwrap());
    assert_eq!(stock, Some(27));
}

#[tokio::test]
async fn test_readiness_checks_data_directory() {
    let data = tempfile::tempdir().unwrap();
    let app = spawn_in(data.path()).await;
    app.client()
        .get("/health/ready")
        .await
        .assert_status(StatusCode::OK);
}
