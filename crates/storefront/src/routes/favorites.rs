//! Favorites handlers.
//!
//! Work for guests too: anonymous visitors get a session guest id, and
//! their list is merged into the account on login.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use inmind_core::ProductId;

use crate::catalog::Product;
use crate::error::Result;
use crate::middleware::{OptionalUser, favorites_owner};
use crate::services::favorites::FavoritesService;
use crate::state::AppState;

/// Whether a product is now a favorite.
#[derive(Debug, Serialize)]
pub struct FavoriteState {
    pub product_id: ProductId,
    pub favorited: bool,
}

/// List favorites.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Vec<Product>>> {
    let owner = favorites_owner(&session, user.as_ref()).await?;
    Ok(Json(FavoritesService::new(state.store()).list(&owner).await?))
}

/// Add a product. Adding an existing favorite is a no-op.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(product_id): Path<ProductId>,
) -> Result<(StatusCode, Json<FavoriteState>)> {
    let owner = favorites_owner(&session, user.as_ref()).await?;
    let product = state.catalog().get_product(product_id).await?;
    let added = FavoritesService::new(state.store())
        .add(&owner, product)
        .await?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(FavoriteState {
            product_id,
            favorited: true,
        }),
    ))
}

/// Remove a product.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<FavoriteState>> {
    let owner = favorites_owner(&session, user.as_ref()).await?;
    FavoritesService::new(state.store())
        .remove(&owner, product_id)
        .await?;
    Ok(Json(FavoriteState {
        product_id,
        favorited: false,
    }))
}

/// Add the product if absent, remove it otherwise.
#[instrument(skip(state, session, user))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<FavoriteState>> {
    let owner = favorites_owner(&session, user.as_ref()).await?;
    let product = state.catalog().get_product(product_id).await?;
    let favorited = FavoritesService::new(state.store())
        .toggle(&owner, product)
        .await?;
    Ok(Json(FavoriteState {
        product_id,
        favorited,
    }))
}

/// Remove every favorite.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<StatusCode> {
    let owner = favorites_owner(&session, user.as_ref()).await?;
    FavoritesService::new(state.store()).clear(&owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
