//! Inventory service.
//!
//! A mock stock ledger in the `inventory_data` slot. Only products that have
//! been added to the ledger are tracked; when the slot is missing or
//! malformed it is re-seeded with two sample items.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use inmind_core::ProductId;

use crate::catalog::Product;
use crate::models::inventory::{InventoryItem, default_inventory};
use crate::storage::{SlotStore, StorageError, keys};

/// Errors from stock changes.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product {0} is not tracked in inventory")]
    NotTracked(ProductId),

    #[error("Insufficient stock for product {product_id}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Inventory service.
pub struct InventoryService<'a> {
    store: &'a SlotStore,
    low_stock_threshold: u32,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore, low_stock_threshold: u32) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    /// The whole ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or seeded.
    pub async fn list(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self
            .store
            .load_or_init(keys::INVENTORY, || default_inventory(Utc::now()))
            .await?)
    }

    /// Run `f` over the ledger under the store's write lock.
    async fn update<R>(
        &self,
        f: impl FnOnce(&mut Vec<InventoryItem>) -> R,
    ) -> Result<R, InventoryError> {
        Ok(self
            .store
            .update_or_init(keys::INVENTORY, || default_inventory(Utc::now()), f)
            .await?)
    }

    /// Track a product, or refresh its details and set its stock.
    /// `initial_stock` is kept for products already tracked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_or_update(
        &self,
        product: &Product,
        stock: u32,
    ) -> Result<InventoryItem, InventoryError> {
        let now = Utc::now();
        let item = self
            .update(|items| {
                let mut item = InventoryItem::from_product(product, stock, now);
                if let Some(existing) = items.iter_mut().find(|i| i.product_id == product.id) {
                    item.initial_stock = existing.initial_stock;
                    *existing = item.clone();
                } else {
                    items.push(item.clone());
                }
                item
            })
            .await?;
        info!(stock, "Inventory item saved");
        Ok(item)
    }

    /// Take stock for an order.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotTracked` or
    /// `InventoryError::InsufficientStock`; stock is unchanged on error.
    #[instrument(skip(self))]
    pub async fn reduce_stock(&self, product_id: ProductId, quantity: u32) -> Result<(), InventoryError> {
        self.reduce_many(&[(product_id, quantity)]).await
    }

    /// Take stock for several lines at once. Either every tracked line is
    /// reduced or nothing changes. Untracked products are skipped when
    /// `skip_untracked` is set, and rejected otherwise.
    pub(crate) async fn reduce_lines(
        &self,
        lines: &[(ProductId, u32)],
        skip_untracked: bool,
    ) -> Result<(), Vec<InventoryError>> {
        let now = Utc::now();
        let result = self
            .update(|items| {
                let mut errors = Vec::new();
                for &(product_id, requested) in lines {
                    match items.iter().find(|i| i.product_id == product_id) {
                        None if skip_untracked => {}
                        None => errors.push(InventoryError::NotTracked(product_id)),
                        Some(item) if item.current_stock < requested => {
                            errors.push(InventoryError::InsufficientStock {
                                product_id,
                                available: item.current_stock,
                                requested,
                            });
                        }
                        Some(_) => {}
                    }
                }
                if !errors.is_empty() {
                    return Err(errors);
                }
                for &(product_id, quantity) in lines {
                    if let Some(item) = items.iter_mut().find(|i| i.product_id == product_id) {
                        item.current_stock -= quantity;
                        item.last_updated = now;
                    }
                }
                Ok(())
            })
            .await
            .map_err(|e| vec![e])?;

        if let Err(errors) = &result {
            warn!(count = errors.len(), "Stock reduction rejected");
        }
        result
    }

    async fn reduce_many(&self, lines: &[(ProductId, u32)]) -> Result<(), InventoryError> {
        self.reduce_lines(lines, false)
            .await
            .map_err(|mut errors| errors.remove(0))
    }

    /// Put stock back, e.g. for a cancelled order. Untracked products are
    /// ignored. Returns whether the product is tracked.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn restore_stock(&self, product_id: ProductId, quantity: u32) -> Result<bool, InventoryError> {
        let now = Utc::now();
        self.update(|items| {
            let item = items.iter_mut().find(|i| i.product_id == product_id)?;
            item.current_stock = item.current_stock.saturating_add(quantity);
            item.last_updated = now;
            Some(())
        })
        .await
        .map(|restored| restored.is_some())
    }

    /// Set a tracked product's stock (admin adjustment).
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotTracked` for unknown products.
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        product_id: ProductId,
        stock: u32,
    ) -> Result<InventoryItem, InventoryError> {
        let now = Utc::now();
        let item = self
            .update(|items| {
                let item = items.iter_mut().find(|i| i.product_id == product_id)?;
                item.current_stock = stock;
                item.last_updated = now;
                Some(item.clone())
            })
            .await?
            .ok_or(InventoryError::NotTracked(product_id))?;
        info!(stock, "Stock updated");
        Ok(item)
    }

    /// Whether at least `quantity` is in stock. Untracked products are not
    /// available.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn is_available(&self, product_id: ProductId, quantity: u32) -> Result<bool, InventoryError> {
        Ok(self
            .find(product_id)
            .await?
            .is_some_and(|i| i.current_stock >= quantity))
    }

    /// Current stock, 0 for untracked products.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn current_stock(&self, product_id: ProductId) -> Result<u32, InventoryError> {
        Ok(self.find(product_id).await?.map_or(0, |i| i.current_stock))
    }

    /// A tracked product's record.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn find(&self, product_id: ProductId) -> Result<Option<InventoryItem>, InventoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|i| i.product_id == product_id))
    }

    /// Items below the low-stock threshold (out-of-stock items included).
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        let threshold = self.low_stock_threshold;
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|i| i.current_stock < threshold)
            .collect())
    }

    /// Items with no stock.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn out_of_stock(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(InventoryItem::is_out_of_stock)
            .collect())
    }

    /// Replace the ledger with the two sample items.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub async fn reset_to_defaults(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        let items = default_inventory(Utc::now());
        self.store.save(keys::INVENTORY, &items).await?;
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use crate::catalog::Rating;

    use super::*;

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Decimal::new(1500, 2),
            description: String::new(),
            category: "electronics".to_string(),
            image: format!("https://img.example.com/{id}.jpg"),
            rating: Rating::default(),
        }
    }

    #[tokio::test]
    async fn test_seeds_defaults_when_missing() {
        let store = SlotStore::in_memory();
        let inventory = InventoryService::new(&store, 10);

        let items = inventory.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 50);
        assert_eq!(inventory.current_stock(ProductId::new(2)).await.unwrap(), 30);
        assert!(store.read(keys::INVENTORY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_slot_reseeds() {
        let store = SlotStore::in_memory();
        store.write(keys::INVENTORY, "oops".to_string()).await.unwrap();
        let items = InventoryService::new(&store, 10).list().await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_or_update_keeps_initial_stock() {
        let store = SlotStore::in_memory();
        let inventory = InventoryService::new(&store, 10);

        let item = inventory.add_or_update(&product(7), 20).await.unwrap();
        assert_eq!(item.initial_stock, 20);
        let item = inventory.add_or_update(&product(7), 5).await.unwrap();
        assert_eq!(item.current_stock, 5);
        assert_eq!(item.initial_stock, 20);
        assert_eq!(inventory.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reduce_and_restore() {
        let store = SlotStore::in_memory();
        let inventory = InventoryService::new(&store, 10);

        inventory.reduce_stock(ProductId::new(2), 25).await.unwrap();
        assert_eq!(inventory.current_stock(ProductId::new(2)).await.unwrap(), 5);

        let err = inventory.reduce_stock(ProductId::new(2), 6).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(inventory.current_stock(ProductId::new(2)).await.unwrap(), 5);

        let err = inventory.reduce_stock(ProductId::new(99), 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotTracked(_)));

        assert!(inventory.restore_stock(ProductId::new(2), 3).await.unwrap());
        assert!(!inventory.restore_stock(ProductId::new(99), 3).await.unwrap());
        assert_eq!(inventory.current_stock(ProductId::new(2)).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_reduce_lines_is_all_or_nothing() {
        let store = SlotStore::in_memory();
        let inventory = InventoryService::new(&store, 10);

        let errors = inventory
            .reduce_lines(&[(ProductId::new(1), 10), (ProductId::new(2), 31)], true)
            .await
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 50);

        inventory
            .reduce_lines(&[(ProductId::new(1), 10), (ProductId::new(42), 3)], true)
            .await
            .unwrap();
        assert_eq!(inventory.current_stock(ProductId::new(1)).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_alerts() {
        let store = SlotStore::in_memory();
        let inventory = InventoryService::new(&store, 10);
        inventory.update_stock(ProductId::new(1), 0).await.unwrap();
        inventory.update_stock(ProductId::new(2), 9).await.unwrap();

        assert_eq!(inventory.low_stock().await.unwrap().len(), 2);
        assert_eq!(inventory.out_of_stock().await.unwrap().len(), 1);
        assert!(!inventory.is_available(ProductId::new(1), 1).await.unwrap());
        assert!(inventory.is_available(ProductId::new(2), 9).await.unwrap());
        assert!(!inventory.is_available(ProductId::new(3), 1).await.unwrap());

        assert!(matches!(
            inventory.update_stock(ProductId::new(3), 5).await,
            Err(InventoryError::NotTracked(_))
        ));
    }
}
