//! Product API types.

use inmind_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as served by the product API.
///
/// Carts and favorites store full snapshots of this type, so a later price
/// change in the API does not alter an existing cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

impl Product {
    /// Price as a displayable USD amount.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Case-insensitive match against title or description.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average score, 0-5.
    pub rate: f64,
    /// Number of ratings.
    pub count: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": {"rate": 3.9, "count": 120}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(10_995, 2));
        assert_eq!(product.rating.count, 120);
        assert_eq!(product.unit_price().display(), "$109.95");
    }

    #[test]
    fn test_matches_query() {
        let product = Product {
            id: ProductId::new(2),
            title: "Mens Casual Premium Slim Fit T-Shirts".to_string(),
            price: Decimal::new(223, 1),
            description: "Slim-fitting style".to_string(),
            category: "men's clothing".to_string(),
            image: String::new(),
            rating: Rating::default(),
        };
        assert!(product.matches_query("t-shirts"));
        assert!(product.matches_query("SLIM-FITTING"));
        assert!(product.matches_query(""));
        assert!(!product.matches_query("backpack"));
    }
}
