//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "<message>"}`, plus `details` for
//! validation and stock errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::services::admin::AdminError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::contact::ContactError;
use crate::services::inventory::InventoryError;
use crate::services::orders::OrderError;
use crate::services::payment_methods::PaymentMethodError;
use crate::services::validation::ValidationError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Slot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Product API operation failed.
    #[error("Product API error: {0}")]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Payment method error: {0}")]
    PaymentMethod(#[from] PaymentMethodError),

    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an error is shown to the client.
struct Rendered {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl Rendered {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    fn validation(err: &ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            details: Some(json!(err.fields)),
        }
    }
}

fn render_catalog(err: &CatalogError) -> Rendered {
    match err {
        CatalogError::NotFound(_) => Rendered::new(StatusCode::NOT_FOUND, "Product not found"),
        _ => Rendered::new(StatusCode::BAD_GATEWAY, "Product service unavailable"),
    }
}

fn render_auth(err: &AuthError) -> Rendered {
    match err {
        AuthError::Validation(v) => Rendered::validation(v),
        AuthError::InvalidCredentials => Rendered::new(StatusCode::UNAUTHORIZED, err.to_string()),
        AuthError::AdminAccessRequired => Rendered::new(StatusCode::FORBIDDEN, err.to_string()),
        AuthError::UserAlreadyExists => Rendered::new(StatusCode::CONFLICT, err.to_string()),
        AuthError::Storage(_) | AuthError::PasswordHash => Rendered::internal(),
    }
}

fn render_inventory(err: &InventoryError) -> Rendered {
    match err {
        InventoryError::NotTracked(_) => Rendered::new(StatusCode::NOT_FOUND, err.to_string()),
        InventoryError::InsufficientStock { .. } => {
            Rendered::new(StatusCode::CONFLICT, err.to_string())
        }
        InventoryError::Storage(_) => Rendered::internal(),
    }
}

fn render_order(err: &OrderError) -> Rendered {
    match err {
        OrderError::InvalidMonth(_) => Rendered::new(StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::Storage(_) => Rendered::internal(),
    }
}

fn render_cart(err: &CartError) -> Rendered {
    match err {
        CartError::InvalidQuantity => Rendered::new(StatusCode::BAD_REQUEST, err.to_string()),
        CartError::Validation(v) => Rendered::validation(v),
        CartError::Storage(_) => Rendered::internal(),
    }
}

impl AppError {
    fn render(&self) -> Rendered {
        match self {
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => Rendered::internal(),
            Self::Catalog(err) => render_catalog(err),
            Self::Auth(err) => render_auth(err),
            Self::Cart(err) => render_cart(err),
            Self::Inventory(err) => render_inventory(err),
            Self::Order(err) => render_order(err),
            Self::Checkout(err) => match err {
                CheckoutError::Validation(v) => Rendered::validation(v),
                CheckoutError::EmptyCart => Rendered::new(StatusCode::BAD_REQUEST, err.to_string()),
                CheckoutError::OutOfStock(shortages) => Rendered {
                    status: StatusCode::CONFLICT,
                    message: err.to_string(),
                    details: Some(json!(shortages)),
                },
                CheckoutError::Cart(e) => render_cart(e),
                CheckoutError::Inventory(e) => render_inventory(e),
                CheckoutError::Order(e) => render_order(e),
            },
            Self::PaymentMethod(err) => match err {
                PaymentMethodError::Validation(v) => Rendered::validation(v),
                PaymentMethodError::NotFound => Rendered::new(StatusCode::NOT_FOUND, err.to_string()),
                PaymentMethodError::Storage(_) => Rendered::internal(),
            },
            Self::Contact(err) => match err {
                ContactError::Validation(v) => Rendered::validation(v),
                ContactError::NotConfigured => {
                    Rendered::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
                }
                ContactError::Http(_) | ContactError::Relay { .. } => Rendered::new(
                    StatusCode::BAD_GATEWAY,
                    "Failed to send message. Please try again later or contact us directly.",
                ),
            },
            Self::Admin(err) => match err {
                AdminError::OrderNotFound => Rendered::new(StatusCode::NOT_FOUND, err.to_string()),
                AdminError::Order(e) => render_order(e),
                AdminError::Inventory(e) => render_inventory(e),
            },
            Self::Validation(v) => Rendered::validation(v),
            Self::NotFound(what) => Rendered::new(StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Unauthorized(msg) => Rendered::new(StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => Rendered::new(StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => Rendered::new(StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => Rendered::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please slow down",
            ),
        }
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.render().status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rendered = self.render();

        // Capture server errors to Sentry
        if rendered.status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut body = json!({ "error": rendered.message });
        if let Some(details) = rendered.details {
            body["details"] = details;
        }

        (rendered.status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}
