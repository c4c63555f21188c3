//! Product list filtering and sorting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Product;

/// Sort options offered on the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// API order.
    #[default]
    Featured,
    /// Price ascending.
    PriceLow,
    /// Price descending.
    PriceHigh,
    /// Rating descending.
    Rating,
}

/// Query parameters for `GET /api/products`.
///
/// Filters apply in order: category, price range, search. A missing price
/// bound is open; both bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default, alias = "query")]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProductFilter {
    /// The category to filter by, if any. Empty and `all` mean no filter.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    fn in_price_range(&self, product: &Product) -> bool {
        self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }

    /// Filter and sort a product list.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let category = self.category();
        let query = self.q.as_deref().unwrap_or_default();

        let mut products: Vec<Product> = products
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| self.in_price_range(p))
            .filter(|p| p.matches_query(query))
            .collect();

        match self.sort {
            SortOrder::Featured => {}
            SortOrder::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Rating => products.sort_by(|a, b| b.rating.rate.total_cmp(&a.rating.rate)),
        }

        products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inmind_core::ProductId;

    use super::*;
    use crate::catalog::Rating;

    fn product(id: i64, category: &str, cents: i64, rate: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Decimal::new(cents, 2),
            description: String::new(),
            category: category.to_string(),
            image: String::new(),
            rating: Rating { rate, count: 1 },
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "electronics", 5999, 4.5),
            product(2, "jewelery", 999, 3.0),
            product(3, "electronics", 1999, 4.5),
            product(4, "men's clothing", 10995, 2.1),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_default_filter_keeps_api_order() {
        let result = ProductFilter::default().apply(catalog());
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_category_all_means_no_filter() {
        let filter = ProductFilter {
            category: Some("all".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(catalog()).len(), 4);

        let filter = ProductFilter {
            category: Some("electronics".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec![1, 3]);
    }

    #[test]
    fn test_price_range_is_inclusive_and_open_ended() {
        let filter = ProductFilter {
            min_price: Some(Decimal::new(1999, 2)),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec![1, 3, 4]);

        let filter = ProductFilter {
            min_price: Some(Decimal::new(999, 2)),
            max_price: Some(Decimal::new(5999, 2)),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(catalog())), vec![1, 2, 3]);
    }

    #[test]
    fn test_sorts() {
        let by = |sort| ProductFilter {
            sort,
            ..Default::default()
        };
        assert_eq!(ids(&by(SortOrder::PriceLow).apply(catalog())), vec![2, 3, 1, 4]);
        assert_eq!(ids(&by(SortOrder::PriceHigh).apply(catalog())), vec![4, 1, 3, 2]);
        // Equal ratings keep API order.
        assert_eq!(ids(&by(SortOrder::Rating).apply(catalog())), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_names() {
        let sort: SortOrder = serde_json::from_str("\"price-low\"").unwrap();
        assert_eq!(sort, SortOrder::PriceLow);
        assert_eq!(serde_json::to_string(&SortOrder::PriceHigh).unwrap(), "\"price-high\"");
    }
}
