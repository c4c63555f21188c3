//! Order history for the logged-in user.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use inmind_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Orders placed with the user's email, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store())
        .by_email(user.email.as_str())
        .await?;
    Ok(Json(orders))
}

/// One order. Other users' orders are reported as missing; admins can see
/// every order.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.store())
        .get(id)
        .await?
        .filter(|order| user.is_admin() || user.email.eq_ignore_case(&order.email))
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    Ok(Json(order))
}
