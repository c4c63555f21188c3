//! Admin API: dashboard, order management, inventory and favorites.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::{Value, json};

use inmind_integration_tests::{Client, TestApp, checkout_form};

/// Log in as the demo shopper, buy `lines` and return the order id.
async fn place_order(app: &TestApp, lines: &[(i64, u32)]) -> i64 {
    let mut client = app.user_client().await;
    buy(&mut client, lines).await
}

async fn buy(client: &mut Client, lines: &[(i64, u32)]) -> i64 {
    for (product_id, quantity) in lines {
        client
            .post(
                "/api/cart/items",
                json!({"product_id": product_id, "quantity": quantity}),
            )
            .await
            .assert_status(StatusCode::OK);
    }
    let resp = client.post("/api/checkout", checkout_form()).await;
    resp.assert_status(StatusCode::CREATED);
    resp.body["order_id"].as_i64().unwrap()
}

fn stock(inventory: &Value, product_id: i64) -> Option<u64> {
    inventory
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == product_id)
        .map(|i| i["current_stock"].as_u64().unwrap())
}

fn money(value: &Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_on_fresh_shop() {
    let app = TestApp::spawn().await;
    let resp = app.admin_client().await.get("/api/admin/dashboard").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["total_orders"], 0);
    assert_eq!(resp.body["pending_orders"], 0);
    assert_eq!(resp.body["stock_alerts"], 0);
    assert!(money(&resp.body["total_revenue"]).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_dashboard_counts_todays_orders() {
    let app = TestApp::spawn().await;
    place_order(&app, &[(2, 1)]).await;
    place_order(&app, &[(9, 1)]).await;

    let resp = app.admin_client().await.get("/api/admin/dashboard").await;
    assert_eq!(resp.body["total_orders"], 2);
    assert_eq!(resp.body["orders_today"], 2);
    assert_eq!(resp.body["pending_orders"], 2);
    // 22.30 + 1.78 tax, 64.00 + 5.12 tax
    assert!((money(&resp.body["total_revenue"]) - 93.2).abs() < 0.001);
    assert!((money(&resp.body["revenue_today"]) - 93.2).abs() < 0.001);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_list_filters() {
    let app = TestApp::spawn().await;
    let first = place_order(&app, &[(2, 1)]).await;
    let second = place_order(&app, &[(9, 1)]).await;
    let mut admin = app.admin_client().await;

    admin
        .patch(
            &format!("/api/admin/orders/{first}"),
            json!({"status": "shipped"}),
        )
        .await
        .assert_status(StatusCode::OK);

    let all = admin.get("/api/admin/orders").await;
    let ids: Vec<i64> = all
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    let shipped = admin.get("/api/admin/orders?status=Shipped").await;
    assert_eq!(shipped.body.as_array().unwrap().len(), 1);
    assert_eq!(shipped.body[0]["id"], first);

    let by_email = admin.get("/api/admin/orders?email=USER@demo.com").await;
    assert_eq!(by_email.body.as_array().unwrap().len(), 2);
    let nobody = admin.get("/api/admin/orders?email=nobody@example.com").await;
    assert_eq!(nobody.body, json!([]));

    let today = Utc::now().date_naive();
    let in_range = admin
        .get(&format!("/api/admin/orders?from={today}&to={today}"))
        .await;
    assert_eq!(in_range.body.as_array().unwrap().len(), 2);
    let before = admin.get("/api/admin/orders?to=2000-01-01").await;
    assert_eq!(before.body, json!([]));

    let resp = admin.get("/api/admin/orders?status=lost").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancelling_restocks_once() {
    let app = TestApp::spawn().await;
    let id = place_order(&app, &[(1, 4)]).await;
    let mut admin = app.admin_client().await;

    let inventory = admin.get("/api/admin/inventory").await;
    assert_eq!(stock(&inventory.body, 1), Some(46));

    let uri = format!("/api/admin/orders/{id}");
    let resp = admin.patch(&uri, json!({"status": "Cancelled"})).await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["status"], "Cancelled");
    let inventory = admin.get("/api/admin/inventory").await;
    assert_eq!(stock(&inventory.body, 1), Some(50));

    // Cancelling again does not add stock twice
    admin.patch(&uri, json!({"status": "Cancelled"})).await;
    let inventory = admin.get("/api/admin/inventory").await;
    assert_eq!(stock(&inventory.body, 1), Some(50));

    // Cancelled orders leave revenue and pending counts
    let dashboard = admin.get("/api/admin/dashboard").await;
    assert_eq!(dashboard.body["total_orders"], 1);
    assert_eq!(dashboard.body["pending_orders"], 0);
    assert!(money(&dashboard.body["total_revenue"]).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_status_change_errors() {
    let app = TestApp::spawn().await;
    let id = place_order(&app, &[(2, 1)]).await;
    let mut admin = app.admin_client().await;

    let resp = admin
        .patch(
            &format!("/api/admin/orders/{id}"),
            json!({"status": "Teleported"}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = admin
        .patch("/api/admin/orders/1", json!({"status": "Shipped"}))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_monthly_stats() {
    let app = TestApp::spawn().await;
    place_order(&app, &[(9, 2)]).await;
    let mut admin = app.admin_client().await;

    let now = Utc::now();
    let resp = admin
        .get(&format!(
            "/api/admin/orders/stats?year={}&month={}",
            now.year(),
            now.month()
        ))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["total_orders"], 1);
    // 128.00 + 10.24 tax
    assert!((money(&resp.body["total_revenue"]) - 138.24).abs() < 0.001);
    assert!((money(&resp.body["average_order_value"]) - 138.24).abs() < 0.001);

    // Defaults to the current month
    let resp = admin.get("/api/admin/orders/stats").await;
    assert_eq!(resp.body["month"], now.month());

    let resp = admin.get("/api/admin/orders/stats?year=2025&month=13").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let resp = admin.get("/api/admin/orders/stats?year=2025&month=0").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_popular_products() {
    let app = TestApp::spawn().await;
    place_order(&app, &[(9, 1), (5, 1)]).await;
    place_order(&app, &[(9, 3)]).await;

    let resp = app
        .admin_client()
        .await
        .get("/api/admin/orders/popular")
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body[0]["product_id"], 9);
    assert_eq!(resp.body[0]["quantity"], 4);
    assert_eq!(resp.body[1]["product_id"], 5);
}

#[tokio::test]
async fn test_delete_and_clear_orders() {
    let app = TestApp::spawn().await;
    let first = place_order(&app, &[(2, 1)]).await;
    place_order(&app, &[(9, 1)]).await;
    let mut admin = app.admin_client().await;

    let uri = format!("/api/admin/orders/{first}");
    admin
        .delete(&uri)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(admin.delete(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        admin.get("/api/admin/orders").await.body.as_array().unwrap().len(),
        1
    );

    admin
        .delete("/api/admin/orders")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(admin.get("/api/admin/orders").await.body, json!([]));
}

// =============================================================================
// Inventory
// =============================================================================

#[tokio::test]
async fn test_inventory_starts_with_sample_items() {
    let app = TestApp::spawn().await;
    let resp = app.admin_client().await.get("/api/admin/inventory").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(stock(&resp.body, 1), Some(50));
    assert_eq!(stock(&resp.body, 2), Some(30));
    assert_eq!(stock(&resp.body, 9), None);
}

#[tokio::test]
async fn test_stock_alerts_follow_adjustments() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin_client().await;

    admin
        .put("/api/admin/inventory/1", json!({"stock": 0}))
        .await
        .assert_status(StatusCode::OK);
    admin
        .put("/api/admin/inventory/2", json!({"stock": 9}))
        .await
        .assert_status(StatusCode::OK);

    let alerts = admin.get("/api/admin/inventory/alerts").await;
    alerts.assert_status(StatusCode::OK);
    assert_eq!(alerts.body["low_stock"].as_array().unwrap().len(), 2);
    let out: Vec<&Value> = alerts.body["out_of_stock"].as_array().unwrap().iter().collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["product_id"], 1);

    let dashboard = admin.get("/api/admin/dashboard").await;
    assert_eq!(dashboard.body["low_stock_items"], 2);
    assert_eq!(dashboard.body["out_of_stock_items"], 1);

    // Out of stock now blocks checkout
    let mut shopper = app.user_client().await;
    shopper
        .post("/api/cart/items", json!({"product_id": 1}))
        .await
        .assert_status(StatusCode::OK);
    let resp = shopper.post("/api/checkout", checkout_form()).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_setting_stock_tracks_new_products() {
    let app = TestApp::spawn().await;
    let mut admin = app.admin_client().await;

    let resp = admin
        .put("/api/admin/inventory/10", json!({"stock": 3}))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["product_name"], "SanDisk SSD");
    assert_eq!(resp.body["current_stock"], 3);

    let inventory = admin.get("/api/admin/inventory").await;
    assert_eq!(stock(&inventory.body, 10), Some(3));

    // Tracked products now limit checkout
    let mut shopper = app.user_client().await;
    buy(&mut shopper, &[(10, 3)]).await;
    let inventory = admin.get("/api/admin/inventory").await;
    assert_eq!(stock(&inventory.body, 10), Some(0));

    let resp = admin
        .put("/api/admin/inventory/404", json!({"stock": 3}))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_popular_favorites_counts_guests_and_users() {
    let app = TestApp::spawn().await;

    let mut guest = app.client();
    guest.put("/api/favorites/5", json!({})).await;
    guest.put("/api/favorites/9", json!({})).await;

    let mut shopper = app.user_client().await;
    shopper.put("/api/favorites/5", json!({})).await;

    let resp = app
        .admin_client()
        .await
        .get("/api/admin/favorites/popular")
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body[0]["product"]["id"], 5);
    assert_eq!(resp.body[0]["count"], 2);
    assert_eq!(resp.body[1]["product"]["id"], 9);
    assert_eq!(resp.body[1]["count"], 1);
}
