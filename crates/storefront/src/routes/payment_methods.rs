//! Saved payment method handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::PaymentMethod;
use crate::services::payment_methods::{NewCard, PaymentMethodService};
use crate::state::AppState;

/// The user's saved cards.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<PaymentMethod>>> {
    Ok(Json(
        PaymentMethodService::new(state.store()).list(user.id).await?,
    ))
}

/// Save a card. Only the last four digits are kept.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(card): Json<NewCard>,
) -> Result<(StatusCode, Json<PaymentMethod>)> {
    let method = PaymentMethodService::new(state.store())
        .add(user.id, card)
        .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

/// Delete a saved card.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    PaymentMethodService::new(state.store())
        .remove(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Make a saved card the default.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_default(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    PaymentMethodService::new(state.store())
        .set_default(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
