//! Slot storage for storefront collections.
//!
//! Every collection (carts, orders, favorites, inventory, users, payment
//! methods) is persisted as one JSON document under a fixed key. Two
//! backends exist:
//!
//! - `Directory` - one `<key>.json` file per slot, written atomically
//!   (temp file + rename)
//! - `Memory` - an in-process map, used by tests and ephemeral runs
//!
//! # Consistency
//!
//! Reads never block. Every write, and every read-modify-write cycle through
//! [`SlotStore::update`], runs under a single async write lock so that two
//! requests mutating the same collection cannot lose each other's changes.
//! There are no cross-slot transactions: last write wins per slot.
//!
//! Malformed JSON is not an error. A slot that fails to parse is treated as
//! missing and a warning is logged, mirroring how a corrupted browser storage
//! entry would simply reset that collection.

pub mod keys;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

use crate::config::StorageConfig;

/// Errors from slot storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on slot {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized.
    #[error("failed to serialize slot {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that are not allowed in slot names.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),
}

/// Handle to the slot store. Cheaply cloneable.
#[derive(Clone)]
pub struct SlotStore {
    inner: Arc<SlotStoreInner>,
}

struct SlotStoreInner {
    backend: Backend,
    write_lock: Mutex<()>,
}

enum Backend {
    Directory(PathBuf),
    Memory(RwLock<HashMap<String, String>>),
}

impl SlotStore {
    /// Open (creating if needed) a directory-backed store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn open_directory(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::Io {
                key: path.display().to_string(),
                source,
            })?;
        Ok(Self::with_backend(Backend::Directory(path)))
    }

    /// Create an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory(RwLock::new(HashMap::new())))
    }

    /// Open the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if a data directory cannot be created.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config {
            StorageConfig::Directory(path) => Self::open_directory(path.clone()).await,
            StorageConfig::Ephemeral => Ok(Self::in_memory()),
        }
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            inner: Arc::new(SlotStoreInner {
                backend,
                write_lock: Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Raw slot access
    // =========================================================================

    /// Read the raw JSON text of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or filesystem failures other than
    /// the slot not existing.
    pub async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        match &self.inner.backend {
            Backend::Memory(map) => Ok(map.read().await.get(key).cloned()),
            Backend::Directory(dir) => match tokio::fs::read_to_string(slot_path(dir, key)).await {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                }),
            },
        }
    }

    /// Overwrite a slot with raw text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or filesystem failures.
    pub async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        validate_key(key)?;
        let _guard = self.inner.write_lock.lock().await;
        self.write_unlocked(key, value).await
    }

    /// Delete a slot. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid keys or filesystem failures.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let _guard = self.inner.write_lock.lock().await;
        self.remove_unlocked(key).await
    }

    /// List slot keys starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the data directory cannot be listed.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = match &self.inner.backend {
            Backend::Memory(map) => map
                .read()
                .await
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect::<Vec<_>>(),
            Backend::Directory(dir) => {
                let io_err = |source| StorageError::Io {
                    key: prefix.to_string(),
                    source,
                };
                let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
                let mut keys = Vec::new();
                while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
                    let name = entry.file_name();
                    if let Some(key) = name.to_str().and_then(|n| n.strip_suffix(".json"))
                        && key.starts_with(prefix)
                        && validate_key(key).is_ok()
                    {
                        keys.push(key.to_string());
                    }
                }
                keys
            }
        };
        keys.sort();
        Ok(keys)
    }

    /// Check that the backend is usable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the data directory is gone or unreadable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        match &self.inner.backend {
            Backend::Memory(_) => Ok(()),
            Backend::Directory(dir) => {
                let meta = tokio::fs::metadata(dir)
                    .await
                    .map_err(|source| StorageError::Io {
                        key: dir.display().to_string(),
                        source,
                    })?;
                if meta.is_dir() {
                    Ok(())
                } else {
                    Err(StorageError::Io {
                        key: dir.display().to_string(),
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotADirectory,
                            "data path is not a directory",
                        ),
                    })
                }
            }
        }
    }

    // =========================================================================
    // Typed access
    // =========================================================================

    /// Load a collection, falling back to `T::default()` when the slot is
    /// missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the slot cannot be read at all.
    pub async fn load<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load_parsed(key).await?.unwrap_or_default())
    }

    /// Load a collection, seeding and persisting `init()` when the slot is
    /// missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or the seed cannot be written.
    pub async fn load_or_init<T, I>(&self, key: &str, init: I) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Serialize,
        I: FnOnce() -> T,
    {
        if let Some(value) = self.load_parsed(key).await? {
            return Ok(value);
        }
        let _guard = self.inner.write_lock.lock().await;
        // Another request may have seeded the slot while we waited.
        if let Some(value) = self.load_parsed(key).await? {
            return Ok(value);
        }
        let value = init();
        self.write_unlocked(key, encode(key, &value)?).await?;
        debug!(key, "seeded slot");
        Ok(value)
    }

    /// Replace a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or written.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = encode(key, value)?;
        self.write(key, text).await
    }

    /// Read-modify-write a collection under the store's write lock.
    ///
    /// A missing or malformed slot starts from `T::default()`. The closure's
    /// return value is passed through. The slot is always written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, serialized or written.
    pub async fn update<T, R, F>(&self, key: &str, f: F) -> Result<R, StorageError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> R,
    {
        self.update_or_init(key, T::default, f).await
    }

    /// Like [`SlotStore::update`], but a missing or malformed slot starts from `init()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, serialized or written.
    #[instrument(skip(self, init, f))]
    pub async fn update_or_init<T, R, I, F>(&self, key: &str, init: I, f: F) -> Result<R, StorageError>
    where
        T: DeserializeOwned + Serialize,
        I: FnOnce() -> T,
        F: FnOnce(&mut T) -> R,
    {
        validate_key(key)?;
        let _guard = self.inner.write_lock.lock().await;
        let mut value = self.load_parsed(key).await?.unwrap_or_else(init);
        let result = f(&mut value);
        self.write_unlocked(key, encode(key, &value)?).await?;
        Ok(result)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Read and parse a slot. `None` for missing or malformed slots.
    async fn load_parsed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(text) = self.read(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "malformed slot, falling back to empty state");
                Ok(None)
            }
        }
    }

    async fn write_unlocked(&self, key: &str, value: String) -> Result<(), StorageError> {
        match &self.inner.backend {
            Backend::Memory(map) => {
                map.write().await.insert(key.to_string(), value);
                Ok(())
            }
            Backend::Directory(dir) => {
                let io_err = |source| StorageError::Io {
                    key: key.to_string(),
                    source,
                };
                let path = slot_path(dir, key);
                let tmp = dir.join(format!("{key}.json.tmp"));
                tokio::fs::write(&tmp, value).await.map_err(io_err)?;
                tokio::fs::rename(&tmp, &path).await.map_err(io_err)
            }
        }
    }

    async fn remove_unlocked(&self, key: &str) -> Result<bool, StorageError> {
        match &self.inner.backend {
            Backend::Memory(map) => Ok(map.write().await.remove(key).is_some()),
            Backend::Directory(dir) => match tokio::fs::remove_file(slot_path(dir, key)).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(source) => Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                }),
            },
        }
    }
}

fn slot_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Slot keys double as file names: `[A-Za-z0-9_-]+` only.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
