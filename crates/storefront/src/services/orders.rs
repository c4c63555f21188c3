//! Order service.
//!
//! All orders live in the `orders_data` slot, newest first. Reporting
//! helpers (revenue, monthly stats, popular products) skip cancelled orders.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use inmind_core::{OrderId, OrderStatus, ProductId, round_money};

use crate::models::order::{NewOrder, Order};
use crate::services::next_epoch_id;
use crate::storage::{SlotStore, StorageError, keys};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Revenue figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
}

/// Sales of one product across non-cancelled orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// A status change, with the status the order had before.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: OrderStatus,
    pub order: Order,
}

/// Order service.
pub struct OrderService<'a> {
    store: &'a SlotStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore) -> Self {
        Self { store }
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.load(keys::ORDERS).await?)
    }

    /// Store a new order at the front of the list.
    ///
    /// The id is the current epoch millisecond, bumped until unique; the date
    /// defaults to now.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self, order), fields(email = %order.email))]
    pub async fn add(&self, order: NewOrder) -> Result<Order, OrderError> {
        let now = Utc::now();
        let order = self
            .store
            .update(keys::ORDERS, |orders: &mut Vec<Order>| {
                let taken: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();
                let order = Order {
                    id: OrderId::new(next_epoch_id(now, &taken)),
                    customer_name: order.customer_name,
                    email: order.email,
                    total: order.total,
                    date: order.date.unwrap_or(now),
                    status: order.status,
                    shipping_address: order.shipping_address,
                    payment_method: order.payment_method,
                    items: order.items,
                };
                orders.insert(0, order.clone());
                order
            })
            .await?;

        info!(order_id = %order.id, total = %order.total, "Order stored");
        Ok(order)
    }

    /// Change an order's status. `None` when the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        Ok(self.change_status(id, status).await?.map(|change| change.order))
    }

    /// Change an order's status and report what it was before.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>, OrderError> {
        let change = self
            .store
            .update(keys::ORDERS, |orders: &mut Vec<Order>| {
                let order = orders.iter_mut().find(|o| o.id == id)?;
                let previous = order.status;
                order.status = status;
                Some(StatusChange {
                    previous,
                    order: order.clone(),
                })
            })
            .await?;

        if let Some(change) = &change {
            info!(from = %change.previous, to = %status, "Order status changed");
        }
        Ok(change)
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.list().await?.into_iter().find(|o| o.id == id))
    }

    /// Orders with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, OrderError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.status == status)
            .collect())
    }

    /// Orders placed with the given email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn by_email(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        let email = email.trim();
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|o| o.email.eq_ignore_ascii_case(email))
            .collect())
    }

    /// Orders placed between `start` and `end`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(in_range(self.list().await?, start, end))
    }

    /// Revenue over all non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn total_revenue(&self) -> Result<Decimal, OrderError> {
        Ok(revenue(&self.list().await?))
    }

    /// Revenue over non-cancelled orders placed between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn revenue_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Decimal, OrderError> {
        Ok(revenue(&self.by_date_range(start, end).await?))
    }

    /// Orders placed on the same UTC day as `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn todays_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, OrderError> {
        Ok(placed_on(self.list().await?, now.date_naive()))
    }

    /// Revenue from today's non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn todays_revenue(&self, now: DateTime<Utc>) -> Result<Decimal, OrderError> {
        Ok(revenue(&self.todays_orders(now).await?))
    }

    /// Order count, revenue and average order value for a month (1-12),
    /// over non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidMonth` for a month outside 1-12.
    pub async fn monthly_stats(&self, year: i32, month: u32) -> Result<MonthlyStats, OrderError> {
        if !(1..=12).contains(&month) {
            return Err(OrderError::InvalidMonth(month));
        }
        Ok(monthly_stats(&self.list().await?, year, month))
    }

    /// Delete an order. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<bool, OrderError> {
        let deleted = self
            .store
            .update(keys::ORDERS, |orders: &mut Vec<Order>| {
                let before = orders.len();
                orders.retain(|o| o.id != id);
                orders.len() != before
            })
            .await?;
        if deleted {
            info!("Order deleted");
        }
        Ok(deleted)
    }

    /// Products ranked by quantity sold across non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn popular_products(&self) -> Result<Vec<ProductSales>, OrderError> {
        Ok(popular_products(&self.list().await?))
    }

    /// Delete every order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<(), OrderError> {
        self.store.save(keys::ORDERS, &Vec::<Order>::new()).await?;
        info!("All orders cleared");
        Ok(())
    }
}

// =============================================================================
// Reporting
// =============================================================================

/// Sum of totals of non-cancelled orders.
#[must_use]
pub fn revenue(orders: &[Order]) -> Decimal {
    round_money(
        orders
            .iter()
            .filter(|o| o.counts_as_revenue())
            .map(|o| o.total)
            .sum(),
    )
}

fn in_range(orders: Vec<Order>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| o.date >= start && o.date <= end)
        .collect()
}

fn placed_on(orders: Vec<Order>, day: NaiveDate) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| o.date.date_naive() == day)
        .collect()
}

/// Monthly figures over non-cancelled orders. `month` is 1-12.
#[must_use]
pub fn monthly_stats(orders: &[Order], year: i32, month: u32) -> MonthlyStats {
    let in_month: Vec<&Order> = orders
        .iter()
        .filter(|o| o.counts_as_revenue() && o.date.year() == year && o.date.month() == month)
        .collect();

    let total_orders = in_month.len();
    let total_revenue = round_money(in_month.iter().map(|o| o.total).sum());
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        round_money(total_revenue / Decimal::from(total_orders))
    };

    MonthlyStats {
        year,
        month,
        total_orders,
        total_revenue,
        average_order_value,
    }
}

/// Quantity and revenue per product over non-cancelled orders, by quantity
/// descending, ties by product id.
#[must_use]
pub fn popular_products(orders: &[Order]) -> Vec<ProductSales> {
    let mut sales: BTreeMap<ProductId, ProductSales> = BTreeMap::new();
    for item in orders
        .iter()
        .filter(|o| o.counts_as_revenue())
        .flat_map(|o| &o.items)
    {
        let entry = sales.entry(item.product_id).or_insert_with(|| ProductSales {
            product_id: item.product_id,
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: 0,
            revenue: Decimal::ZERO,
        });
        entry.quantity = entry.quantity.saturating_add(u64::from(item.quantity));
        let line = item
            .price
            .checked_mul(Decimal::from(item.quantity))
            .unwrap_or(Decimal::MAX);
        entry.revenue = entry.revenue.saturating_add(line);
    }

    let mut ranked: Vec<ProductSales> = sales.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranked
}
