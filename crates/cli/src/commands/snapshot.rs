//! Snapshot export, import, and reset.
//!
//! # Usage
//!
//! ```bash
//! np-state export cart > cart.json
//! np-state import cart cart.json
//! np-state reset
//! ```

use std::path::Path;

use storefront_state::StoreState;

use super::{CommandError, ensure_persisted};

/// Which store a snapshot command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Cart,
    Wishlist,
}

/// Print a store's snapshot JSON.
///
/// # Errors
///
/// Returns `CommandError::Snapshot` if the state cannot be encoded.
pub fn export(state: &StoreState, target: Target) -> Result<(), CommandError> {
    let raw = match target {
        Target::Cart => state.with_cart(|cart| cart.snapshot())?,
        Target::Wishlist => state.with_wishlist(|wishlist| wishlist.snapshot())?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{raw}");
    }
    Ok(())
}

/// Replace a store's state from a snapshot file.
///
/// # Errors
///
/// Returns `CommandError::ReadFile` if the file cannot be read,
/// `CommandError::Snapshot` if it is not a valid snapshot, or
/// `CommandError::NotPersisted` if the new state could not be written.
pub fn import(state: &StoreState, target: Target, path: &Path) -> Result<(), CommandError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CommandError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;

    match target {
        Target::Cart => state.with_cart(|cart| {
            cart.restore_from_snapshot(&raw)?;
            tracing::info!(lines = cart.items().len(), "Imported cart snapshot");
            ensure_persisted("Cart", cart.last_persist_error())
        }),
        Target::Wishlist => state.with_wishlist(|wishlist| {
            wishlist.restore_from_snapshot(&raw)?;
            tracing::info!(items = wishlist.total_items(), "Imported wishlist snapshot");
            ensure_persisted("Wishlist", wishlist.last_persist_error())
        }),
    }
}

/// Delete both persisted records.
///
/// Both removals are attempted even if the first one fails.
///
/// # Errors
///
/// Returns `CommandError::Snapshot` with the first failure if either record
/// cannot be removed.
pub fn reset(state: &StoreState) -> Result<(), CommandError> {
    let cart = state.with_cart(|cart| cart.clear_storage());
    let wishlist = state.with_wishlist(|wishlist| wishlist.clear_storage());

    if let Err(e) = &cart {
        tracing::error!(error = %e, "Failed to clear cart snapshot");
    }
    if let Err(e) = &wishlist {
        tracing::error!(error = %e, "Failed to clear wishlist snapshot");
    }
    cart.and(wishlist)?;

    tracing::info!("Cleared cart and wishlist snapshots");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use storefront_state::{
        MemoryStorage, StateConfig, StateStorage, StorageBackend, StorageError,
    };
    use storefront_state_core::{CartLineItem, WishlistItem};

    use super::*;

    fn memory_state() -> (StoreState, MemoryStorage) {
        let storage = MemoryStorage::new();
        let config = StateConfig {
            backend: StorageBackend::Memory,
            ..StateConfig::default()
        };
        (StoreState::with_storage(config, Arc::new(storage.clone())), storage)
    }

    #[test]
    fn test_import_replaces_cart() {
        let (source, _) = memory_state();
        source.with_cart(|cart| cart.add_item(CartLineItem::new("p", "v", "Tee", 10.0, 3)));
        let raw = source.with_cart(|cart| cart.snapshot()).unwrap();

        let path = std::env::temp_dir().join(format!("np-state-import-{}.json", std::process::id()));
        std::fs::write(&path, raw).unwrap();

        let (target, _) = memory_state();
        import(&target, Target::Cart, &path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(target.with_cart(|cart| cart.total_items()), 3);
    }

    #[test]
    fn test_import_missing_file() {
        let (state, _) = memory_state();
        let result = import(&state, Target::Wishlist, Path::new("/nonexistent/snapshot.json"));
        assert!(matches!(result, Err(CommandError::ReadFile { .. })));
    }

    #[test]
    fn test_reset_deletes_records() {
        let (state, storage) = memory_state();
        state.with_cart(|cart| cart.open_cart());
        state.with_wishlist(|w| w.add_item(WishlistItem::new("mug", "Mug", 12.0)));

        reset(&state).unwrap();

        assert!(storage.get_item("cart-storage").unwrap().is_none());
        assert!(storage.get_item("wishlist-storage").unwrap().is_none());
        assert!(!state.with_cart(|cart| cart.is_open()));
    }

    /// Memory storage that refuses to delete one key.
    #[derive(Debug)]
    struct StuckKeyStorage {
        inner: MemoryStorage,
        stuck: &'static str,
    }

    impl StateStorage for StuckKeyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            if key == self.stuck {
                return Err(StorageError::Io {
                    key: key.to_owned(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
                });
            }
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_reset_clears_wishlist_when_cart_fails() {
        let storage = MemoryStorage::new();
        let config = StateConfig {
            backend: StorageBackend::Memory,
            ..StateConfig::default()
        };
        let state = StoreState::with_storage(
            config,
            Arc::new(StuckKeyStorage {
                inner: storage.clone(),
                stuck: "cart-storage",
            }),
        );
        state.with_cart(|cart| cart.open_cart());
        state.with_wishlist(|w| w.add_item(WishlistItem::new("mug", "Mug", 12.0)));

        let result = reset(&state);

        assert!(matches!(result, Err(CommandError::Snapshot(_))));
        assert!(storage.get_item("cart-storage").unwrap().is_some());
        assert!(storage.get_item("wishlist-storage").unwrap().is_none());
        assert_eq!(state.with_wishlist(|w| w.total_items()), 0);
    }
}
