//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inmind_core::{CardType, OrderId, OrderStatus, ProductId};

/// A placed order. Orders are stored newest first in the `orders_data` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub email: String,
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method: OrderPaymentMethod,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether the order counts towards revenue.
    #[must_use]
    pub const fn counts_as_revenue(&self) -> bool {
        !self.status.is_cancelled()
    }
}

/// An order before it is stored; the order service assigns id and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub email: String,
    pub total: Decimal,
    /// Defaults to now.
    pub date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method: OrderPaymentMethod,
    pub items: Vec<OrderItem>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Decimal,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// What an order remembers about the card: last four digits and network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaymentMethod {
    pub card_last4: String,
    pub card_type: CardType,
}
