//! Login, signup, sessions and access control.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use inmind_integration_tests::TestApp;

fn signup_form(email: &str) -> Value {
    json!({
        "email": email,
        "username": "janedoe",
        "password": "hunter22",
        "confirm_password": "hunter22",
        "firstname": "Jane",
        "lastname": "Doe",
        "phone": "5551234567"
    })
}

// =============================================================================
// Demo Accounts
// =============================================================================

#[tokio::test]
async fn test_demo_login_starts_a_session() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.login("user@demo.com", "password123", "user").await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["username"], "user");
    assert_eq!(resp.body["role"], "user");
    assert!(resp.body["token"].as_str().unwrap().starts_with("demo-"));

    let me = client.get("/api/auth/me").await;
    me.assert_status(StatusCode::OK);
    assert_eq!(me.body["email"], "user@demo.com");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    let resp = app
        .client()
        .login("user@demo.com", "nope", "user")
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_admin_login_requires_admin_role() {
    let app = TestApp::spawn().await;
    let resp = app
        .client()
        .login("user@demo.com", "password123", "admin")
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["error"], "Admin access required");
}

#[tokio::test]
async fn test_demo_accounts_can_be_disabled() {
    let app = TestApp::spawn_with(|config| config.shop.demo_accounts = false).await;
    let resp = app
        .client()
        .login("admin@demo.com", "admin123", "admin")
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_signup_logs_in_and_hides_password() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let resp = client.post("/api/auth/signup", signup_form("jane@example.com")).await;
    resp.assert_status(StatusCode::CREATED);
    assert_eq!(resp.body["username"], "janedoe");
    assert!(resp.body.get("password").is_none());
    assert!(resp.body.get("password_hash").is_none());

    client.get("/api/auth/me").await.assert_status(StatusCode::OK);

    // The stored account accepts the password from a fresh browser
    let resp = app
        .client()
        .login("JANE@example.com", "hunter22", "user")
        .await;
    resp.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    app.client()
        .post("/api/auth/signup", signup_form("jane@example.com"))
        .await
        .assert_status(StatusCode::CREATED);

    let resp = app
        .client()
        .post("/api/auth/signup", signup_form("Jane@Example.com"))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["error"], "User already exists with this email");
}

#[tokio::test]
async fn test_signup_reports_every_invalid_field() {
    let app = TestApp::spawn().await;
    let resp = app
        .client()
        .post(
            "/api/auth/signup",
            json!({
                "email": "not-an-email",
                "username": "jd",
                "password": "123",
                "firstname": "",
                "lastname": "Doe",
                "phone": "12"
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = resp.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for field in ["email", "username", "password", "firstname", "phone"] {
        assert!(fields.contains(&field), "missing {field} in {fields:?}");
    }
}

#[tokio::test]
async fn test_admin_signup_needs_configuration() {
    let mut form = signup_form("boss@example.com");
    form["role"] = json!("admin");

    let app = TestApp::spawn().await;
    let resp = app.client().post("/api/auth/signup", form.clone()).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let app = TestApp::spawn_with(|config| config.shop.allow_admin_signup = true).await;
    let resp = app.client().post("/api/auth/signup", form).await;
    resp.assert_status(StatusCode::CREATED);
    assert_eq!(resp.body["role"], "admin");
}

// =============================================================================
// Profile and Logout
// =============================================================================

#[tokio::test]
async fn test_profile_update_is_reflected_in_session() {
    let app = TestApp::spawn().await;
    let mut client = app.client();
    client
        .post("/api/auth/signup", signup_form("jane@example.com"))
        .await
        .assert_status(StatusCode::CREATED);

    let resp = client
        .patch("/api/auth/me", json!({"firstname": "Janet", "phone": "+1 555 123 4567"}))
        .await;
    resp.assert_status(StatusCode::OK);
    assert_eq!(resp.body["firstname"], "Janet");

    let me = client.get("/api/auth/me").await;
    assert_eq!(me.body["firstname"], "Janet");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    let mut client = app.user_client().await;

    client
        .post("/api/auth/logout", json!({}))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let resp = client.get("/api/auth/me").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Access Control
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_login() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    for uri in ["/api/cart", "/api/orders", "/api/payment-methods", "/api/auth/me"] {
        let resp = client.get(uri).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.body["error"], "Please log in to continue");
    }
}

#[tokio::test]
async fn test_admin_routes_reject_shoppers() {
    let app = TestApp::spawn().await;

    let resp = app.client().get("/api/admin/dashboard").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app.user_client().await.get("/api/admin/dashboard").await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.admin_client().await.get("/api/admin/dashboard").await;
    resp.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_guest_favorites_follow_login() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    client
        .put("/api/favorites/5", json!({}))
        .await
        .assert_status(StatusCode::CREATED);

    client
        .login("user@demo.com", "password123", "user")
        .await
        .assert_status(StatusCode::OK);

    let resp = client.get("/api/favorites").await;
    resp.assert_status(StatusCode::OK);
    let ids: Vec<i64> = resp
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5]);

    // A different browser logging into the same account sees them too
    let other = app.user_client().await.get("/api/favorites").await;
    assert_eq!(other.body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_login_is_rate_limited_per_client_ip() {
    let app = TestApp::spawn_with(|config| config.rate_limiting = true).await;
    let mut client = app.client().with_forwarded_for("203.0.113.9");

    for _ in 0..5 {
        let resp = client.login("user@demo.com", "wrong", "user").await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
    }

    let resp = client.login("user@demo.com", "password123", "user").await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.body["error"], "Too many requests, please slow down");

    // Another address still has its full burst.
    let mut other = app.client().with_forwarded_for("198.51.100.4");
    let resp = other.login("user@demo.com", "password123", "user").await;
    resp.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_leaves_other_routes_alone() {
    let app = TestApp::spawn_with(|config| config.rate_limiting = true).await;
    let mut client = app.client().with_forwarded_for("203.0.113.10");

    for _ in 0..8 {
        client.get("/api/products").await.assert_status(StatusCode::OK);
    }
}
