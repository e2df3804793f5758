//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{StateStorage, StorageError, validate_key};

/// Process-local storage.
///
/// Clones share the same map, so a test can drop a store and rehydrate a
/// fresh one from the same storage to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty storage area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panicking writer cannot leave a HashMap half-updated.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_basic_contract() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert!(storage.get_item("missing").unwrap().is_none());

        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));

        // overwrite keeps len()
        storage.set_item("a", "ONE").unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("ONE"));

        storage.remove_item("b").unwrap();
        assert_eq!(storage.len(), 1);
        assert!(storage.get_item("b").unwrap().is_none());

        // removing an absent key is not an error
        storage.remove_item("b").unwrap();
    }

    #[test]
    fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_storage_rejects_invalid_key() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.set_item("a/b", "v"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
