//! Product catalog handlers.
//!
//! Thin wrappers over the product API client; filtering and sorting happen
//! here because the upstream API only supports whole-list reads.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use inmind_core::ProductId;

use crate::catalog::{Product, ProductFilter};
use crate::error::Result;
use crate::state::AppState;

/// List products, filtered and sorted by the query string.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = match filter.category() {
        Some(category) => state.catalog().products_in_category(category).await?,
        None => state.catalog().list_products().await?,
    };
    Ok(Json(filter.apply(products)))
}

/// A single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product(id).await?))
}

/// Other products from the same category.
#[instrument(skip(state))]
pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<Product>>> {
    let product = state.catalog().get_product(id).await?;
    Ok(Json(state.catalog().similar_products(&product).await?))
}

/// Category names.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().list_categories().await?))
}

/// Products in one category.
#[instrument(skip(state))]
pub async fn category_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().products_in_category(&name).await?))
}
