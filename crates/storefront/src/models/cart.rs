//! Cart types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inmind_core::{ProductId, UserId};

use crate::catalog::Product;

/// Most units of one product a cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// One cart line: a product snapshot and a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Price times quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// Sum of line totals.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .map(CartItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum of quantities.
#[must_use]
pub fn cart_item_count(items: &[CartItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Header badge data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub user_id: UserId,
    pub item_count: u64,
    pub total: Decimal,
}
