//! Favorites service.
//!
//! Logged-in users keep favorites under `favorites_<userId>`. Guests get a
//! random id stored in their session and a `favorites_guest_<guestId>` slot,
//! which is merged into the user's list on login or signup.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, instrument};

use inmind_core::{ProductId, UserId};

use crate::catalog::Product;
use crate::storage::{SlotStore, StorageError, keys};

/// Whose favorites list to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesOwner {
    User(UserId),
    Guest(String),
}

impl FavoritesOwner {
    fn key(&self) -> String {
        match self {
            Self::User(id) => keys::user_favorites(*id),
            Self::Guest(guest_id) => keys::guest_favorites(guest_id),
        }
    }
}

/// How many favorites lists contain a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteCount {
    pub product: Product,
    pub count: u32,
}

/// Favorites service.
pub struct FavoritesService<'a> {
    store: &'a SlotStore,
}

impl<'a> FavoritesService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore) -> Self {
        Self { store }
    }

    /// Favorites in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn list(&self, owner: &FavoritesOwner) -> Result<Vec<Product>, StorageError> {
        self.store.load(&owner.key()).await
    }

    /// Add a product. Returns `false` if it was already a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, owner: &FavoritesOwner, product: Product) -> Result<bool, StorageError> {
        self.store
            .update(&owner.key(), |favorites: &mut Vec<Product>| {
                if favorites.iter().any(|p| p.id == product.id) {
                    false
                } else {
                    favorites.push(product);
                    true
                }
            })
            .await
    }

    /// Remove a product. Returns `false` if it was not a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        owner: &FavoritesOwner,
        product_id: ProductId,
    ) -> Result<bool, StorageError> {
        self.store
            .update(&owner.key(), |favorites: &mut Vec<Product>| {
                let before = favorites.len();
                favorites.retain(|p| p.id != product_id);
                favorites.len() != before
            })
            .await
    }

    /// Add the product if absent, remove it if present. Returns whether it is
    /// a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, owner: &FavoritesOwner, product: Product) -> Result<bool, StorageError> {
        self.store
            .update(&owner.key(), |favorites: &mut Vec<Product>| {
                if let Some(pos) = favorites.iter().position(|p| p.id == product.id) {
                    favorites.remove(pos);
                    false
                } else {
                    favorites.push(product);
                    true
                }
            })
            .await
    }

    /// Whether the product is a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn contains(
        &self,
        owner: &FavoritesOwner,
        product_id: ProductId,
    ) -> Result<bool, StorageError> {
        Ok(self.list(owner).await?.iter().any(|p| p.id == product_id))
    }

    /// Number of favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn count(&self, owner: &FavoritesOwner) -> Result<usize, StorageError> {
        Ok(self.list(owner).await?.len())
    }

    /// Remove every favorite (the slot itself is removed).
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn clear(&self, owner: &FavoritesOwner) -> Result<(), StorageError> {
        self.store.remove(&owner.key()).await?;
        Ok(())
    }

    /// Merge a guest's favorites into a user's list, skipping duplicates, and
    /// drop the guest slot. Returns how many products were added.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn migrate_guest(&self, guest_id: &str, user: UserId) -> Result<usize, StorageError> {
        let guest_key = keys::guest_favorites(guest_id);
        let guest: Vec<Product> = self.store.load(&guest_key).await?;
        if guest.is_empty() {
            return Ok(0);
        }

        let added = self
            .store
            .update(&keys::user_favorites(user), |favorites: &mut Vec<Product>| {
                let mut added = 0;
                for product in guest {
                    if !favorites.iter().any(|p| p.id == product.id) {
                        favorites.push(product);
                        added += 1;
                    }
                }
                added
            })
            .await?;
        self.store.remove(&guest_key).await?;

        info!(added, "Migrated guest favorites");
        Ok(added)
    }

    /// Count, across every user and guest list, how many contain each
    /// product. Most popular first; ties by product id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    #[instrument(skip(self))]
    pub async fn popularity(&self) -> Result<Vec<FavoriteCount>, StorageError> {
        let mut counts: BTreeMap<ProductId, FavoriteCount> = BTreeMap::new();
        let slot_keys = self.store.keys_with_prefix(keys::FAVORITES_PREFIX).await?;
        debug!(lists = slot_keys.len(), "Scanning favorites lists");

        for key in slot_keys {
            let favorites: Vec<Product> = self.store.load(&key).await?;
            for product in favorites {
                counts
                    .entry(product.id)
                    .or_insert_with(|| FavoriteCount {
                        product,
                        count: 0,
                    })
                    .count += 1;
            }
        }

        let mut ranked: Vec<FavoriteCount> = counts.into_values().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(ranked)
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
            price: Decimal::new(1000, 2),
            description: String::new(),
            category: "jewelery".to_string(),
            image: String::new(),
            rating: Rating::default(),
        }
    }

    fn user(id: i64) -> FavoritesOwner {
        FavoritesOwner::User(UserId::new(id))
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let store = SlotStore::in_memory();
        let favorites = FavoritesService::new(&store);

        assert!(favorites.add(&user(2), product(1)).await.unwrap());
        assert!(!favorites.add(&user(2), product(1)).await.unwrap());
        assert_eq!(favorites.count(&user(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_toggle_and_remove() {
        let store = SlotStore::in_memory();
        let favorites = FavoritesService::new(&store);

        assert!(favorites.toggle(&user(2), product(3)).await.unwrap());
        assert!(favorites.contains(&user(2), ProductId::new(3)).await.unwrap());
        assert!(!favorites.toggle(&user(2), product(3)).await.unwrap());
        assert!(!favorites.contains(&user(2), ProductId::new(3)).await.unwrap());

        favorites.add(&user(2), product(4)).await.unwrap();
        assert!(favorites.remove(&user(2), ProductId::new(4)).await.unwrap());
        assert!(!favorites.remove(&user(2), ProductId::new(4)).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_removes_slot() {
        let store = SlotStore::in_memory();
        let favorites = FavoritesService::new(&store);
        favorites.add(&user(2), product(1)).await.unwrap();

        favorites.clear(&user(2)).await.unwrap();
        assert!(store.read("favorites_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_migrate_guest_merges_without_duplicates() {
        let store = SlotStore::in_memory();
        let favorites = FavoritesService::new(&store);
        let guest = FavoritesOwner::Guest("abc123".to_string());

        favorites.add(&user(2), product(1)).await.unwrap();
        favorites.add(&guest, product(1)).await.unwrap();
        favorites.add(&guest, product(2)).await.unwrap();

        let added = favorites.migrate_guest("abc123", UserId::new(2)).await.unwrap();
        assert_eq!(added, 1);

        let ids: Vec<i64> = favorites
            .list(&user(2))
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(store.read("favorites_guest_abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_popularity_counts_lists() {
        let store = SlotStore::in_memory();
        let favorites = FavoritesService::new(&store);
        favorites.add(&user(1), product(5)).await.unwrap();
        favorites.add(&user(2), product(5)).await.unwrap();
        favorites.add(&user(2), product(6)).await.unwrap();
        favorites
            .add(&FavoritesOwner::Guest("g1".to_string()), product(6))
            .await
            .unwrap();
        favorites
            .add(&FavoritesOwner::Guest("g1".to_string()), product(7))
            .await
            .unwrap();

        let ranked = favorites.popularity().await.unwrap();
        let summary: Vec<(i64, u32)> = ranked.iter().map(|c| (c.product.id.as_i64(), c.count)).collect();
        assert_eq!(summary, vec![(5, 2), (6, 2), (7, 1)]);
    }
}
