//! CLI command implementations.

pub mod inventory;
pub mod orders;
pub mod users;

use thiserror::Error;

use inmind_storefront::catalog::{CatalogClient, CatalogError};
use inmind_storefront::config::{ConfigError, ShopConfig, StorefrontConfig};
use inmind_storefront::services::auth::AuthError;
use inmind_storefront::services::inventory::InventoryError;
use inmind_storefront::services::orders::OrderError;
use inmind_storefront::storage::{SlotStore, StorageError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Product API error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Inventory(#[from] InventoryError),

    #[error("{0}")]
    Order(#[from] OrderError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Unknown `--status` value.
    #[error("Invalid status: {0}. Valid statuses: processing, shipped, delivered, cancelled")]
    InvalidStatus(String),
}

/// What every command needs: the slot store the server uses and the
/// product API for lookups.
pub struct Context {
    pub store: SlotStore,
    pub catalog: CatalogClient,
    pub shop: ShopConfig,
}

impl Context {
    /// Open the storefront's configured storage.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the data directory
    /// cannot be opened.
    pub async fn from_env() -> Result<Self, CommandError> {
        let config = StorefrontConfig::from_env()?;
        let store = SlotStore::from_config(&config.storage).await?;
        tracing::debug!(storage = ?config.storage, "Opened slot store");

        Ok(Self {
            store,
            catalog: CatalogClient::new(&config.catalog),
            shop: config.shop,
        })
    }
}
