//! Cart store.
//!
//! Holds the shopper's line items in insertion order plus the `is_open`
//! flag for the cart drawer. Lines merge on `variant_id`: adding a variant
//! that is already in the cart accumulates quantity and keeps the metadata
//! (name, price, image) captured by the first add.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use storefront_state_core::{CartLineItem, VariantId};

use crate::persist::{PersistState, Persisted, SnapshotError};
use crate::storage::StateStorage;
use crate::subscription::SubscriptionId;

/// Storage key for the cart snapshot.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Serializable cart contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    /// Whether the cart drawer should be shown. UI state only.
    #[serde(default)]
    pub is_open: bool,
}

impl PersistState for CartState {
    /// Fold lines that share a variant into the first one, the way repeated
    /// `add_item` calls would have. The drawer flag is kept as stored.
    fn normalize(&mut self) {
        let lines = std::mem::take(&mut self.items);
        for line in lines {
            if let Some(existing) = self.find_mut(&line.variant_id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                self.items.push(line);
            }
        }
    }
}

impl CartState {
    /// Merge `item` into the cart and open the drawer.
    ///
    /// An existing line with the same variant gets `quantity` added to it;
    /// every other field of the existing line is kept. Quantities are not
    /// validated here.
    pub fn add_item(&mut self, item: CartLineItem) {
        if let Some(existing) = self.find_mut(&item.variant_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.is_open = true;
    }

    /// Drop the line for `variant_id`, if any.
    pub fn remove_item(&mut self, variant_id: &VariantId) {
        self.items.retain(|item| &item.variant_id != variant_id);
    }

    /// Set a line's quantity exactly, removing it when `quantity <= 0`.
    ///
    /// Does not create a line that is not already in the cart.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(variant_id);
        } else if let Some(existing) = self.find_mut(variant_id) {
            existing.quantity = quantity;
        }
    }

    /// Remove every line. The drawer flag is left as is.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn find(&self, variant_id: &VariantId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.variant_id == variant_id)
    }

    fn find_mut(&mut self, variant_id: &VariantId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.variant_id == variant_id)
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of `(sale_price or price) * quantity`, in line order.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .fold(0.0, |acc, item| acc + item.line_total())
    }
}

/// The persisted cart.
#[derive(Debug)]
pub struct CartStore {
    inner: Persisted<CartState>,
}

impl CartStore {
    /// Rehydrate the cart from [`CART_STORAGE_KEY`].
    #[must_use]
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        Self::open_with_key(CART_STORAGE_KEY, storage)
    }

    /// Rehydrate the cart from a custom key (e.g. a namespaced profile).
    #[must_use]
    pub fn open_with_key(key: &str, storage: Arc<dyn StateStorage>) -> Self {
        Self {
            inner: Persisted::rehydrate(key, storage),
        }
    }

    /// Add a line or accumulate into an existing one; always opens the drawer.
    pub fn add_item(&mut self, item: CartLineItem) {
        tracing::debug!(variant_id = %item.variant_id, quantity = item.quantity, "Adding to cart");
        self.inner.mutate(|cart| cart.add_item(item));
    }

    /// Remove a line. No-op when absent.
    pub fn remove_item(&mut self, variant_id: &VariantId) {
        self.inner.mutate(|cart| cart.remove_item(variant_id));
    }

    /// Overwrite a line's quantity; `<= 0` removes it. No-op when absent.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) {
        self.inner
            .mutate(|cart| cart.update_quantity(variant_id, quantity));
    }

    /// Empty the cart without touching the drawer flag.
    pub fn clear_cart(&mut self) {
        self.inner.mutate(CartState::clear);
    }

    pub fn open_cart(&mut self) {
        self.inner.mutate(|cart| cart.is_open = true);
    }

    pub fn close_cart(&mut self) {
        self.inner.mutate(|cart| cart.is_open = false);
    }

    pub fn toggle_cart(&mut self) {
        self.inner.mutate(|cart| cart.is_open = !cart.is_open);
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.inner.state().items
    }

    #[must_use]
    pub fn get_item(&self, variant_id: &VariantId) -> Option<&CartLineItem> {
        self.inner.state().find(variant_id)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.state().is_open
    }

    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.inner.state().total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.inner.state().total_price()
    }

    /// The full committed state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        self.inner.state()
    }

    /// Register a callback invoked after each committed change.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&CartState) + Send + 'static,
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

    /// Replace the cart from snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a valid cart snapshot.
    pub fn restore_from_snapshot(&mut self, raw: &str) -> Result<(), SnapshotError> {
        self.inner.restore_from_snapshot(raw)
    }

    /// Delete the persisted record and reset to an empty, closed cart.
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
