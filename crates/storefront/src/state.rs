//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::{ShopConfig, StorefrontConfig};
use crate::services::contact::{ContactClient, ContactError};
use crate::storage::{SlotStore, StorageError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("contact relay: {0}")]
    Contact(#[from] ContactError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the slot store, the product API client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: SlotStore,
    catalog: CatalogClient,
    contact: ContactClient,
}

impl AppState {
    /// Create a new application state, opening the configured slot store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// contact relay client cannot be built.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = SlotStore::from_config(&config.storage).await?;
        Self::with_store(config, store)
    }

    /// Create application state around an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the contact relay client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: SlotStore) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.catalog);
        let contact = ContactClient::new(config.contact_relay_url.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                contact,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Shop rules (tax rate, stock threshold, demo logins).
    #[must_use]
    pub fn shop(&self) -> &ShopConfig {
        &self.inner.config.shop
    }

    /// Get a reference to the slot store.
    #[must_use]
    pub fn store(&self) -> &SlotStore {
        &self.inner.store
    }

    /// Get a reference to the product API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the contact relay client.
    #[must_use]
    pub fn contact(&self) -> &ContactClient {
        &self.inner.contact
    }
}
