//! Admin API handlers. Every handler requires an admin session.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use inmind_core::{OrderId, OrderStatus, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{InventoryItem, Order};
use crate::services::admin::{AdminService, Dashboard};
use crate::services::favorites::{FavoriteCount, FavoritesService};
use crate::services::inventory::{InventoryError, InventoryService};
use crate::services::orders::{MonthlyStats, OrderService, ProductSales};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Order list filters. Dates are inclusive UTC days.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub email: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl OrderQuery {
    fn status(&self) -> Result<Option<OrderStatus>> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(AppError::BadRequest)
    }

    fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        let start = self.from.map_or(DateTime::<Utc>::MIN_UTC, |d| {
            d.and_hms_opt(0, 0, 0)
                .map_or(DateTime::<Utc>::MIN_UTC, |t| t.and_utc())
        });
        let end = self.to.map_or(DateTime::<Utc>::MAX_UTC, |d| {
            d.and_hms_milli_opt(23, 59, 59, 999)
                .map_or(DateTime::<Utc>::MAX_UTC, |t| t.and_utc())
        });
        Some((start, end))
    }
}

/// Month selector for stats; defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: u32,
}

/// Items needing attention. Low stock includes out-of-stock items.
#[derive(Debug, Serialize)]
pub struct StockAlerts {
    pub low_stock: Vec<InventoryItem>,
    pub out_of_stock: Vec<InventoryItem>,
}

// =============================================================================
// Dashboard
// =============================================================================

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Dashboard>> {
    let dashboard = AdminService::new(state.store(), state.shop())
        .dashboard(Utc::now())
        .await?;
    Ok(Json(dashboard))
}

// =============================================================================
// Orders
// =============================================================================

/// All orders, newest first, narrowed by the query filters.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    let status = query.status()?;
    let service = OrderService::new(state.store());
    let mut orders = match query.range() {
        Some((start, end)) => service.by_date_range(start, end).await?,
        None => service.list().await?,
    };

    if let Some(status) = status {
        orders.retain(|o| o.status == status);
    }
    if let Some(email) = query.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        orders.retain(|o| o.email.eq_ignore_ascii_case(email));
    }
    Ok(Json(orders))
}

/// Best-selling products across non-cancelled orders.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn popular_products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<ProductSales>>> {
    Ok(Json(
        OrderService::new(state.store()).popular_products().await?,
    ))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn monthly_stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<StatsQuery>,
) -> Result<Json<MonthlyStats>> {
    let now = Utc::now();
    let stats = OrderService::new(state.store())
        .monthly_stats(
            query.year.unwrap_or_else(|| now.year()),
            query.month.unwrap_or_else(|| now.month()),
        )
        .await?;
    Ok(Json(stats))
}

/// Change an order's status. Cancelling restocks its items.
#[instrument(skip(state, admin, update), fields(admin_id = %admin.id, status = %update.status))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let status: OrderStatus = update.status.parse().map_err(AppError::BadRequest)?;
    let order = AdminService::new(state.store(), state.shop())
        .change_order_status(id, status)
        .await?;
    Ok(Json(order))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    if OrderService::new(state.store()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Order".to_string()))
    }
}

/// Delete every order.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn clear_orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<StatusCode> {
    OrderService::new(state.store()).clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Inventory
// =============================================================================

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn inventory(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.store(), state.shop().low_stock_threshold);
    Ok(Json(service.list().await?))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn stock_alerts(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<StockAlerts>> {
    let service = InventoryService::new(state.store(), state.shop().low_stock_threshold);
    Ok(Json(StockAlerts {
        low_stock: service.low_stock().await?,
        out_of_stock: service.out_of_stock().await?,
    }))
}

/// Set a product's stock. Products not yet tracked are looked up in the
/// catalog and start being tracked.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn set_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<ProductId>,
    Json(update): Json<StockUpdate>,
) -> Result<Json<InventoryItem>> {
    let service = InventoryService::new(state.store(), state.shop().low_stock_threshold);
    let item = match service.update_stock(product_id, update.stock).await {
        Ok(item) => item,
        Err(InventoryError::NotTracked(_)) => {
            let product = state.catalog().get_product(product_id).await?;
            service.add_or_update(&product, update.stock).await?
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(item))
}

// =============================================================================
// Favorites
// =============================================================================

/// Products by how many favorites lists contain them.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn popular_favorites(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<FavoriteCount>>> {
    Ok(Json(FavoritesService::new(state.store()).popularity().await?))
}
