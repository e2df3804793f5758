//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_STATE_BACKEND` - `file` or `memory` (default: file)
//! - `STOREFRONT_STATE_DIR` - Snapshot directory for the file backend
//!   (default: .storefront-state)
//! - `STOREFRONT_STATE_KEY_PREFIX` - Namespace prepended to both store keys,
//!   e.g. `staging` gives `staging.cart-storage`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::cart::CART_STORAGE_KEY;
use crate::storage::{FileStorage, MemoryStorage, StateStorage, StorageError, validate_key};
use crate::wishlist::WISHLIST_STORAGE_KEY;

const DEFAULT_STATE_DIR: &str = ".storefront-state";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where snapshots are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// One JSON file per store under `data_dir`.
    #[default]
    File,
    /// Process memory; nothing survives a restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{other}' (expected file or memory)")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    /// Storage backend
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub data_dir: PathBuf,
    /// Optional namespace for store keys
    pub key_prefix: Option<String>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: PathBuf::from(DEFAULT_STATE_DIR),
            key_prefix: None,
        }
    }
}

impl StateConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("STOREFRONT_STATE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>().map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_STATE_BACKEND".to_string(), e)
            })?,
            None => StorageBackend::default(),
        };

        let data_dir = lookup("STOREFRONT_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        let key_prefix = lookup("STOREFRONT_STATE_KEY_PREFIX").filter(|p| !p.is_empty());
        if let Some(prefix) = &key_prefix {
            validate_key(prefix).map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_STATE_KEY_PREFIX".to_string(), e.to_string())
            })?;
        }

        Ok(Self {
            backend,
            data_dir,
            key_prefix,
        })
    }

    /// Storage key for the cart.
    #[must_use]
    pub fn cart_key(&self) -> String {
        self.namespaced(CART_STORAGE_KEY)
    }

    /// Storage key for the wishlist.
    #[must_use]
    pub fn wishlist_key(&self) -> String {
        self.namespaced(WISHLIST_STORAGE_KEY)
    }

    fn namespaced(&self, key: &str) -> String {
        self.key_prefix
            .as_ref()
            .map_or_else(|| key.to_owned(), |prefix| format!("{prefix}.{key}"))
    }

    /// Open the configured storage backend.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file backend's directory cannot be
    /// created.
    pub fn open_storage(&self) -> Result<Arc<dyn StateStorage>, StorageError> {
        let storage: Arc<dyn StateStorage> = match self.backend {
            StorageBackend::File => Arc::new(FileStorage::open(&self.data_dir)?),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}
