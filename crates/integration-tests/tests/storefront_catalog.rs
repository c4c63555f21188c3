//! Catalog endpoints against a mocked product API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use inmind_integration_tests::TestApp;

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");

    client.get("/health/ready").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn().await;
    let resp = app.client().get("/api/categories").await;

    assert!(resp.headers.contains_key("x-request-id"));
    assert_eq!(resp.headers["x-frame-options"], "DENY");
    assert_eq!(resp.headers["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::spawn().await;
    let resp = app.client().get("/api/nope").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Route not found");
}

// =============================================================================
// Listing, Filtering, Sorting
// =============================================================================

#[tokio::test]
async fn test_list_products_in_api_order() {
    let app = TestApp::spawn().await;
    let resp = app.client().get("/api/products").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(ids(&resp.body), vec![1, 2, 5, 9, 10]);
}

#[tokio::test]
async fn test_filter_by_category_and_price() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.get("/api/products?category=electronics").await;
    assert_eq!(ids(&resp.body), vec![9, 10]);

    let resp = client
        .get("/api/products?category=all&min_price=50&max_price=110")
        .await;
    assert_eq!(ids(&resp.body), vec![1, 9, 10]);
}

#[tokio::test]
async fn test_search_matches_title_ignoring_case() {
    let app = TestApp::spawn().await;
    let resp = app.client().get("/api/products?q=BACKPACK").await;
    assert_eq!(ids(&resp.body), vec![1]);
}

#[tokio::test]
async fn test_sort_orders() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.get("/api/products?sort=price-low").await;
    assert_eq!(ids(&resp.body), vec![2, 9, 10, 1, 5]);

    let resp = client.get("/api/products?sort=price-high").await;
    assert_eq!(ids(&resp.body), vec![5, 1, 10, 9, 2]);

    let resp = client.get("/api/products?sort=rating").await;
    assert_eq!(ids(&resp.body), vec![5, 2, 1, 9, 10]);
}

#[tokio::test]
async fn test_invalid_sort_is_rejected() {
    let app = TestApp::spawn().await;
    let resp = app.client().get("/api/products?sort=cheapest").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Details and Categories
// =============================================================================

#[tokio::test]
async fn test_product_detail_and_similar() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.get("/api/products/9").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["title"], "Portable Hard Drive");
    let price: f64 = resp.body["price"].as_str().unwrap().parse().unwrap();
    assert!((price - 64.0).abs() < f64::EPSILON);

    let resp = client.get("/api/products/9/similar").await;
    assert_eq!(ids(&resp.body), vec![10]);
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/products/404"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&app.product_api)
        .await;

    let resp = app.client().get("/api/products/404").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Product not found");
}

#[tokio::test]
async fn test_categories_and_category_products() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.get("/api/categories").await;
    assert_eq!(
        resp.body,
        serde_json::json!(["men's clothing", "jewelery", "electronics"])
    );

    let resp = client.get("/api/categories/men's%20clothing/products").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(ids(&resp.body), vec![1, 2]);
}

#[tokio::test]
async fn test_product_api_outage_is_bad_gateway() {
    let app = TestApp::spawn().await;
    app.product_api.reset().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.product_api)
        .await;

    let resp = app.client().get("/api/products").await;
    assert_eq!(resp.status, StatusCode::BAD_GATEWAY);
}
