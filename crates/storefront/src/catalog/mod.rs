//! Product API client.
//!
//! Products, categories and search all come from a FakeStore-compatible REST
//! API. Responses are cached with `moka` for the configured TTL (5 minutes by
//! default); search and "similar products" are computed from the cached
//! product list.

mod cache;
pub mod filter;
pub mod types;

use std::sync::Arc;

use inmind_core::ProductId;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};
pub use filter::{ProductFilter, SortOrder};
pub use types::{Product, Rating};

/// How many products the "similar products" strip shows.
pub const SIMILAR_PRODUCTS_LIMIT: usize = 6;

/// Errors from the product API.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Product API returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Failed to parse product API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Product not found: {0}")]
    NotFound(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the product API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new product API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Build the URL for an API path such as `products/1`.
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a path and return the raw body of a successful response.
    async fn get_text(&self, path: &str) -> Result<String, CatalogError> {
        let url = self.url(path);
        let response = self
            .inner
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Product API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    /// GET a path and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let body = self.get_text(path).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse product API response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// All products, in API order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products").await?;
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// A single product.
    ///
    /// The API answers unknown ids with an empty body rather than a 404, so
    /// an empty or `null` body is reported as `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for unknown ids, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let body = self.get_text(&format!("products/{id}")).await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(format!("product {id}")));
        }
        let product: Product = serde_json::from_str(trimmed)?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Vec<String> = self.get_json("products/categories").await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Products in one category. The name is URL-encoded
    /// (`men's clothing` → `men%27s%20clothing`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Category(category.to_string());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            return Ok(products);
        }

        let path = format!("products/category/{}", urlencoding::encode(category));
        let products: Vec<Product> = self.get_json(&path).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Products whose title or description contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        let products = self.list_products().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.matches_query(query))
            .collect())
    }

    /// Up to six other products from the same category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category cannot be fetched.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn similar_products(&self, product: &Product) -> Result<Vec<Product>, CatalogError> {
        let products = self.products_in_category(&product.category).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(SIMILAR_PRODUCTS_LIMIT)
            .collect())
    }
}
