//! Inventory ledger types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inmind_core::ProductId;

use crate::catalog::Product;

/// Stock record for one tracked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image: String,
    pub current_stock: u32,
    /// Stock when the product was first tracked; kept across updates.
    pub initial_stock: u32,
    pub price: Decimal,
    pub category: String,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// Start tracking a product.
    #[must_use]
    pub fn from_product(product: &Product, stock: u32, now: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id,
            product_name: product.title.clone(),
            product_image: product.image.clone(),
            current_stock: stock,
            initial_stock: stock,
            price: product.price,
            category: product.category.clone(),
            last_updated: now,
        }
    }

    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.current_stock == 0
    }
}

/// The ledger used when the `inventory_data` slot is missing or malformed.
#[must_use]
pub fn default_inventory(now: DateTime<Utc>) -> Vec<InventoryItem> {
    vec![
        InventoryItem {
            product_id: ProductId::new(1),
            product_name: "Sample Product 1".to_string(),
            product_image: "/assets/product1.jpg".to_string(),
            current_stock: 50,
            initial_stock: 50,
            price: Decimal::new(2999, 2),
            category: "Electronics".to_string(),
            last_updated: now,
        },
        InventoryItem {
            product_id: ProductId::new(2),
            product_name: "Sample Product 2".to_string(),
            product_image: "/assets/product2.jpg".to_string(),
            current_stock: 30,
            initial_stock: 30,
            price: Decimal::new(4999, 2),
            category: "Clothing".to_string(),
            last_updated: now,
        },
    ]
}
