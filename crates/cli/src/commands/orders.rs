//! Order commands.

use tracing::info;

use inmind_core::{OrderStatus, Price};
use inmind_storefront::services::orders::OrderService;

use super::{CommandError, Context};

/// List orders, newest first.
///
/// # Errors
///
/// Returns an error for an unknown status or if storage cannot be read.
pub async fn list(ctx: &Context, status: Option<&str>) -> Result<(), CommandError> {
    let service = OrderService::new(&ctx.store);
    let orders = match status {
        Some(status) => {
            let status: OrderStatus = status
                .parse()
                .map_err(|_| CommandError::InvalidStatus(status.to_owned()))?;
            service.by_status(status).await?
        }
        None => service.list().await?,
    };

    info!("Orders ({})", orders.len());
    info!("==========");
    for order in &orders {
        info!(
            "  {} {} {:<10} {:<30} {:>3} items {}",
            order.id,
            order.date.format("%Y-%m-%d"),
            order.status,
            order.email,
            order.item_count(),
            Price::usd(order.total)
        );
    }
    Ok(())
}

/// Order count and revenue for one month.
///
/// # Errors
///
/// Returns an error for a month outside 1-12 or if storage cannot be read.
pub async fn stats(ctx: &Context, year: i32, month: u32) -> Result<(), CommandError> {
    let stats = OrderService::new(&ctx.store)
        .monthly_stats(year, month)
        .await?;

    info!("Orders for {year}-{month:02}");
    info!("  Orders:          {}", stats.total_orders);
    info!("  Revenue:         {}", Price::usd(stats.total_revenue));
    info!("  Average order:   {}", Price::usd(stats.average_order_value));
    Ok(())
}
