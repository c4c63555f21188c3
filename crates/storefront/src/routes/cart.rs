//! Cart handlers. Carts belong to logged-in users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use inmind_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireUser;
use crate::models::CartItem;
use crate::models::cart::{cart_item_count, cart_total};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Cart contents with totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u64,
    pub total: Decimal,
}

impl From<Vec<CartItem>> for CartView {
    fn from(items: Vec<CartItem>) -> Self {
        Self {
            item_count: cart_item_count(&items),
            total: cart_total(&items),
            items,
        }
    }
}

/// Item count for the header badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity change request. Zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Show the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartView>> {
    let items = CartService::new(state.store()).items(user.id).await?;
    Ok(Json(items.into()))
}

/// Cart item count.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartCount>> {
    let count = CartService::new(state.store()).item_count(user.id).await?;
    Ok(Json(CartCount { count }))
}

/// Add a product. The product is looked up so the cart keeps a snapshot of
/// its title, price and image.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %request.product_id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let product = state.catalog().get_product(request.product_id).await?;
    let items = CartService::new(state.store())
        .add(user.id, product, request.quantity)
        .await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", request.product_id.to_string()),
            ("quantity", request.quantity.to_string()),
        ],
    );
    Ok(Json(items.into()))
}

/// Change a line's quantity.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let items = CartService::new(state.store())
        .update_quantity(user.id, product_id, request.quantity)
        .await?;
    Ok(Json(items.into()))
}

/// Remove a line.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let items = CartService::new(state.store())
        .remove(user.id, product_id)
        .await?;
    Ok(Json(items.into()))
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    CartService::new(state.store()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
