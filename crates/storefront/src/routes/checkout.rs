//! Checkout handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::{info, instrument};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::services::checkout::{CheckoutRequest, CheckoutService, OrderConfirmation};
use crate::state::AppState;

/// Turn the cart into an order.
///
/// Stock is checked for every line before anything changes; on success the
/// cart is emptied and the confirmation returned with 201.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let confirmation = CheckoutService::new(state.store(), state.shop())
        .place_order(&user, request)
        .await?;

    info!(order_id = %confirmation.order_id, total = %confirmation.total, "Order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        &[("order_id", confirmation.order_id.to_string())],
    );
    Ok((StatusCode::CREATED, Json(confirmation)))
}
