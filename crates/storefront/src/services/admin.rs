//! Admin panel operations that span several collections.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use inmind_core::{OrderId, OrderStatus};

use crate::config::ShopConfig;
use crate::models::order::Order;
use crate::services::inventory::{InventoryError, InventoryService};
use crate::services::orders::{OrderError, OrderService, revenue};
use crate::storage::SlotStore;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Order not found")]
    OrderNotFound,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub total_orders: usize,
    /// Excludes cancelled orders.
    pub total_revenue: Decimal,
    pub orders_today: usize,
    pub revenue_today: Decimal,
    /// Orders still `Processing`.
    pub pending_orders: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    /// Low-stock plus out-of-stock items.
    pub stock_alerts: usize,
}

/// Admin service.
pub struct AdminService<'a> {
    store: &'a SlotStore,
    shop: &'a ShopConfig,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore, shop: &'a ShopConfig) -> Self {
        Self { store, shop }
    }

    fn inventory(&self) -> InventoryService<'a> {
        InventoryService::new(self.store, self.shop.low_stock_threshold)
    }

    /// Dashboard figures as of `now` (today is the UTC day).
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<Dashboard, AdminError> {
        let orders = OrderService::new(self.store).list().await?;
        let today = now.date_naive();
        let todays: Vec<Order> = orders
            .iter()
            .filter(|o| o.date.date_naive() == today)
            .cloned()
            .collect();

        let inventory = self.inventory();
        let low_stock_items = inventory.low_stock().await?.len();
        let out_of_stock_items = inventory.out_of_stock().await?.len();

        Ok(Dashboard {
            total_orders: orders.len(),
            total_revenue: revenue(&orders),
            orders_today: todays.len(),
            revenue_today: revenue(&todays),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Processing)
                .count(),
            low_stock_items,
            out_of_stock_items,
            stock_alerts: low_stock_items + out_of_stock_items,
        })
    }

    /// Change an order's status. Moving an order into `Cancelled` puts its
    /// tracked items back in stock; an order that was already cancelled is
    /// never restocked twice.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::OrderNotFound` for unknown orders.
    #[instrument(skip(self))]
    pub async fn change_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        let change = OrderService::new(self.store)
            .change_status(id, status)
            .await?
            .ok_or(AdminError::OrderNotFound)?;

        if status.is_cancelled() && !change.previous.is_cancelled() {
            let inventory = self.inventory();
            for item in &change.order.items {
                inventory.restore_stock(item.product_id, item.quantity).await?;
            }
            info!(order_id = %id, items = change.order.items.len(), "Restocked cancelled order");
        }

        Ok(change.order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inmind_core::{CardType, ProductId};

    use crate::models::order::{NewOrder, OrderItem, OrderPaymentMethod, ShippingAddress};

    use super::*;

    fn new_order(product: i64, quantity: u32, cents: i64, date: DateTime<Utc>) -> NewOrder {
        NewOrder {
            customer_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            total: Decimal::new(cents, 2),
            date: Some(date),
            status: OrderStatus::Processing,
            shipping_address: ShippingAddress::default(),
            payment_method: OrderPaymentMethod {
                card_last4: "4242".to_string(),
                card_type: CardType::Visa,
            },
            items: vec![OrderItem {
                product_id: ProductId::new(product),
                name: format!("Product {product}"),
                quantity,
                price: Decimal::new(cents, 2),
                image: String::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_once() {
        let store = SlotStore::in_memory();
        let shop = ShopConfig::default();
        let admin = AdminService::new(&store, &shop);
        let inventory = InventoryService::new(&store, 10);
        inventory.reduce_stock(ProductId::new(1), 4).await.unwrap();

        let order = OrderService::new(&store)
            .add(new_order(1, 4, 2999, Utc::now()))
            .await
            .unwrap();

        admin
            .change_order_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 50);

        admin
            .change_order_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 50);

        admin
            .change_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let store = SlotStore::in_memory();
        let shop = ShopConfig::default();
        let err = AdminService::new(&store, &shop)
            .change_order_status(OrderId::new(1), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::OrderNotFound));
    }

    #[tokio::test]
    async fn test_dashboard() {
        let store = SlotStore::in_memory();
        let shop = ShopConfig::default();
        let admin = AdminService::new(&store, &shop);
        let orders = OrderService::new(&store);
        let now = Utc::now();

        orders
            .add(new_order(1, 1, 1000, now - chrono::Duration::days(2)))
            .await
            .unwrap();
        orders.add(new_order(2, 1, 2500, now)).await.unwrap();
        let cancelled = orders.add(new_order(2, 1, 9900, now)).await.unwrap();
        admin
            .change_order_status(cancelled.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        InventoryService::new(&store, 10)
            .update_stock(ProductId::new(2), 0)
            .await
            .unwrap();

        let dashboard = admin.dashboard(now).await.unwrap();
        assert_eq!(dashboard.total_orders, 3);
        assert_eq!(dashboard.total_revenue, Decimal::new(3500, 2));
        assert_eq!(dashboard.orders_today, 2);
        assert_eq!(dashboard.revenue_today, Decimal::new(2500, 2));
        assert_eq!(dashboard.pending_orders, 2);
        assert_eq!(dashboard.low_stock_items, 1);
        assert_eq!(dashboard.out_of_stock_items, 1);
        assert_eq!(dashboard.stock_alerts, 2);
    }
}
