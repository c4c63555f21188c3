//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                           - Liveness
//! GET    /health/ready                     - Storage readiness
//!
//! # Catalog
//! GET    /api/products                     - ?q&category&min_price&max_price&sort
//! GET    /api/products/{id}
//! GET    /api/products/{id}/similar
//! GET    /api/categories
//! GET    /api/categories/{name}/products
//!
//! # Auth (rate limited)
//! POST   /api/auth/signup
//! POST   /api/auth/login
//! POST   /api/auth/logout
//! GET    /api/auth/me
//! PATCH  /api/auth/me
//!
//! # Cart (requires login)
//! GET    /api/cart
//! DELETE /api/cart
//! GET    /api/cart/count
//! POST   /api/cart/items
//! PATCH  /api/cart/items/{product_id}
//! DELETE /api/cart/items/{product_id}
//!
//! # Favorites (user or guest)
//! GET    /api/favorites
//! DELETE /api/favorites
//! PUT    /api/favorites/{product_id}
//! DELETE /api/favorites/{product_id}
//! POST   /api/favorites/{product_id}/toggle
//!
//! # Checkout and account (requires login)
//! POST   /api/checkout
//! GET    /api/orders
//! GET    /api/orders/{id}
//! GET    /api/payment-methods
//! POST   /api/payment-methods
//! DELETE /api/payment-methods/{id}
//! POST   /api/payment-methods/{id}/default
//!
//! # Contact
//! POST   /api/contact
//!
//! # Admin (requires admin)
//! GET    /api/admin/dashboard
//! GET    /api/admin/orders                 - ?status&email&from&to
//! DELETE /api/admin/orders
//! GET    /api/admin/orders/popular
//! GET    /api/admin/orders/stats           - ?year&month
//! PATCH  /api/admin/orders/{id}
//! DELETE /api/admin/orders/{id}
//! GET    /api/admin/inventory
//! GET    /api/admin/inventory/alerts
//! PUT    /api/admin/inventory/{product_id}
//! GET    /api/admin/favorites/popular
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod payment_methods;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the product and category routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/similar", get(products::similar))
        .route("/categories", get(products::categories))
        .route("/categories/{name}/products", get(products::category_products))
}

/// Create the auth routes router, optionally rate limited.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).patch(auth::update_me));

    if rate_limited {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            axum::routing::patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index).delete(favorites::clear))
        .route(
            "/{product_id}",
            put(favorites::add).delete(favorites::remove),
        )
        .route("/{product_id}/toggle", post(favorites::toggle))
}

/// Create the saved payment method routes router.
pub fn payment_method_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payment_methods::index).post(payment_methods::create))
        .route("/{id}", axum::routing::delete(payment_methods::delete))
        .route("/{id}/default", post(payment_methods::set_default))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/orders", get(admin::orders).delete(admin::clear_orders))
        .route("/orders/popular", get(admin::popular_products))
        .route("/orders/stats", get(admin::monthly_stats))
        .route(
            "/orders/{id}",
            axum::routing::patch(admin::update_order_status).delete(admin::delete_order),
        )
        .route("/inventory", get(admin::inventory))
        .route("/inventory/alerts", get(admin::stock_alerts))
        .route("/inventory/{product_id}", put(admin::set_stock))
        .route("/favorites/popular", get(admin::popular_favorites))
}

/// Create all API routes for the storefront.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .nest("/auth", auth_routes(rate_limited))
        .nest("/cart", cart_routes())
        .nest("/favorites", favorites_routes())
        .route("/checkout", post(checkout::place_order))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .nest("/payment-methods", payment_method_routes())
        .route("/contact", post(contact::send))
        .nest("/admin", admin_routes());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}
