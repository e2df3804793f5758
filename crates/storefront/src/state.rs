//! Store state shared across consumers.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cart::CartStore;
use crate::config::StateConfig;
use crate::error::StateError;
use crate::storage::StateStorage;
use crate::wishlist::WishlistStore;

/// The process's cart and wishlist.
///
/// This struct is cheaply cloneable via `Arc`. Build it once at startup and
/// hand clones to whatever needs the stores; every clone sees the same
/// single cart and single wishlist.
#[derive(Clone)]
pub struct StoreState {
    inner: Arc<StoreStateInner>,
}

struct StoreStateInner {
    config: StateConfig,
    storage: Arc<dyn StateStorage>,
    cart: Mutex<CartStore>,
    wishlist: Mutex<WishlistStore>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("config", &self.inner.config)
            .field("storage", &self.inner.storage)
            .finish_non_exhaustive()
    }
}

impl StoreState {
    /// Open the configured storage and rehydrate both stores.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Storage` if the storage backend cannot be opened.
    /// Unreadable snapshots are not an error; those stores start empty.
    pub fn new(config: StateConfig) -> Result<Self, StateError> {
        let storage = config.open_storage()?;
        Ok(Self::with_storage(config, storage))
    }

    /// Rehydrate both stores from an already-open storage backend.
    #[must_use]
    pub fn with_storage(config: StateConfig, storage: Arc<dyn StateStorage>) -> Self {
        let cart = CartStore::open_with_key(&config.cart_key(), Arc::clone(&storage));
        let wishlist = WishlistStore::open_with_key(&config.wishlist_key(), Arc::clone(&storage));

        tracing::info!(
            backend = %config.backend,
            cart_items = cart.items().len(),
            wishlist_items = wishlist.total_items(),
            "Stores rehydrated"
        );

        Self {
            inner: Arc::new(StoreStateInner {
                config,
                storage,
                cart: Mutex::new(cart),
                wishlist: Mutex::new(wishlist),
            }),
        }
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StateConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StateStorage> {
        &self.inner.storage
    }

    /// Run `f` with exclusive access to the cart.
    ///
    /// Calls are serialized. Do not call `with_cart` again from inside `f`
    /// or from a cart subscriber; it will deadlock.
    pub fn with_cart<R>(&self, f: impl FnOnce(&mut CartStore) -> R) -> R {
        // Store operations leave state consistent at every step, so a
        // poisoned lock is still safe to reuse.
        let mut cart = self
            .inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Run `f` with exclusive access to the wishlist.
    ///
    /// Same locking rules as [`StoreState::with_cart`].
    pub fn with_wishlist<R>(&self, f: impl FnOnce(&mut WishlistStore) -> R) -> R {
        let mut wishlist = self
            .inner
            .wishlist
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut wishlist)
    }
}
