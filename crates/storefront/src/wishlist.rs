//! Wishlist store.
//!
//! Membership is keyed on `product_id` and is boolean: adding a product that
//! is already saved does nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storefront_state_core::{ProductId, WishlistItem};

use crate::persist::{PersistState, Persisted, SnapshotError};
use crate::storage::StateStorage;
use crate::subscription::SubscriptionId;

/// Storage key for the wishlist snapshot.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist-storage";

/// Serializable wishlist contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WishlistState {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl PersistState for WishlistState {
    /// Keep the first entry for each product.
    fn normalize(&mut self) {
        let items = std::mem::take(&mut self.items);
        for item in items {
            self.add_item(item);
        }
    }
}

impl WishlistState {
    /// Append `item` unless its product is already saved.
    pub fn add_item(&mut self, item: WishlistItem) {
        if !self.contains(&item.product_id) {
            self.items.push(item);
        }
    }

    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product_id != product_id);
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Add when absent, remove when present. Returns the new membership.
    pub fn toggle_item(&mut self, item: WishlistItem) -> bool {
        if self.contains(&item.product_id) {
            self.remove_item(&item.product_id);
            false
        } else {
            self.items.push(item);
            true
        }
    }
}

/// The persisted wishlist.
#[derive(Debug)]
pub struct WishlistStore {
    inner: Persisted<WishlistState>,
}

impl WishlistStore {
    /// Rehydrate the wishlist from [`WISHLIST_STORAGE_KEY`].
    #[must_use]
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        Self::open_with_key(WISHLIST_STORAGE_KEY, storage)
    }

    #[must_use]
    pub fn open_with_key(key: &str, storage: Arc<dyn StateStorage>) -> Self {
        Self {
            inner: Persisted::rehydrate(key, storage),
        }
    }

    pub fn add_item(&mut self, item: WishlistItem) {
        self.inner.mutate(|wishlist| wishlist.add_item(item));
    }

    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.inner.mutate(|wishlist| wishlist.remove_item(product_id));
    }

    /// Heart-button behaviour: add when absent, remove when present.
    pub fn toggle_item(&mut self, item: WishlistItem) -> bool {
        self.inner.mutate(|wishlist| wishlist.toggle_item(item))
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.inner.state().contains(product_id)
    }

    pub fn clear_wishlist(&mut self) {
        self.inner.mutate(|wishlist| wishlist.items.clear());
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.inner.state().items
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.inner.state().items.len()
    }

    #[must_use]
    pub const fn state(&self) -> &WishlistState {
        self.inner.state()
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&WishlistState) + Send + 'static,
    ) -> SubscriptionId {
        self.inner.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    /// Snapshot JSON for the current state.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Encode` if serialization fails.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        self.inner.snapshot()
    }

    /// Replace the wishlist from snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a valid wishlist snapshot.
    pub fn restore_from_snapshot(&mut self, raw: &str) -> Result<(), SnapshotError> {
        self.inner.restore_from_snapshot(raw)
    }

    /// Delete the persisted record and reset to an empty wishlist.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Storage` if the record cannot be removed.
    pub fn clear_storage(&mut self) -> Result<(), SnapshotError> {
        self.inner.clear_storage()
    }

    #[must_use]
    pub const fn last_persist_error(&self) -> Option<&SnapshotError> {
        self.inner.last_persist_error()
    }
}
