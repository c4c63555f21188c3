//! Inventory commands.

use chrono::Utc;
use tracing::{info, warn};

use inmind_core::{Price, ProductId};
use inmind_storefront::services::inventory::{InventoryError, InventoryService};

use super::{CommandError, Context};

fn service(ctx: &Context) -> InventoryService<'_> {
    InventoryService::new(&ctx.store, ctx.shop.low_stock_threshold)
}

/// Show every tracked product, then the alerts.
///
/// # Errors
///
/// Returns an error if storage cannot be read.
pub async fn list(ctx: &Context) -> Result<(), InventoryError> {
    let inventory = service(ctx);
    let items = inventory.list().await?;

    info!("Inventory ({} products)", items.len());
    info!("========================");
    for item in &items {
        info!(
            "  #{:<5} {:<40} {:>4} / {:<4} {}",
            item.product_id,
            item.product_name,
            item.current_stock,
            item.initial_stock,
            Price::usd(item.price)
        );
    }

    let out = inventory.out_of_stock().await?;
    let low = inventory.low_stock().await?;
    for item in &out {
        warn!("Out of stock: #{} {}", item.product_id, item.product_name);
    }
    for item in low.iter().filter(|i| !i.is_out_of_stock()) {
        warn!(
            "Low stock: #{} {} ({} left)",
            item.product_id, item.product_name, item.current_stock
        );
    }
    Ok(())
}

/// Set a product's stock, tracking it first if needed.
///
/// # Errors
///
/// Returns an error if the product is unknown to the product API or
/// storage fails.
pub async fn set(ctx: &Context, product_id: i64, stock: u32) -> Result<(), CommandError> {
    let product_id = ProductId::new(product_id);
    let inventory = service(ctx);

    let item = match inventory.update_stock(product_id, stock).await {
        Ok(item) => item,
        Err(InventoryError::NotTracked(_)) => {
            info!("Product #{product_id} not tracked yet, fetching from the product API");
            let product = ctx.catalog.get_product(product_id).await?;
            inventory.add_or_update(&product, stock).await?
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "#{} {} now has {} in stock (updated {})",
        item.product_id,
        item.product_name,
        item.current_stock,
        item.last_updated.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

/// Replace the inventory with the default seed.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub async fn seed(ctx: &Context) -> Result<(), InventoryError> {
    let items = service(ctx).reset_to_defaults().await?;
    info!(
        "Inventory reset to {} default products at {}",
        items.len(),
        Utc::now().format("%Y-%m-%d %H:%M")
    );
    Ok(())
}
