//! Durable key/value storage for store snapshots.
//!
//! # Backends
//!
//! - [`FileStorage`] - One JSON file per key under a root directory
//! - [`MemoryStorage`] - Process-local map, for tests and throwaway sessions
//!
//! Storage is deliberately dumb: it moves opaque strings. The
//! [`persist`](crate::persist) layer decides what goes in them.

mod file;
mod memory;

use std::fmt::Debug;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters outside `[A-Za-z0-9_.-]`.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A localStorage-style key/value area.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait StateStorage: Send + Sync + Debug {
    /// Retrieve the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the backend fails.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the backend fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`.
    ///
    /// Returns `Ok(())` even if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the backend fails.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Check that a key is non-empty and limited to `[A-Za-z0-9_.-]`.
///
/// Keys double as file names, so anything that could escape the root
/// directory is rejected. Leading dots are rejected for the same reason.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` if the key fails the check.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid_chars = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if key.is_empty() || key.starts_with('.') || !valid_chars {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_store_keys() {
        assert!(validate_key("cart-storage").is_ok());
        assert!(validate_key("wishlist-storage").is_ok());
        assert!(validate_key("staging.cart-storage").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_segments() {
        assert!(matches!(
            validate_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(validate_key("a/b").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("cart:storage").is_err());
    }
}
