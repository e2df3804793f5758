//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! np-state cart add --product tee --variant tee-m --name "Tee" --price 20 -q 2
//! np-state cart set-qty tee-m 5
//! np-state cart remove tee-m
//! np-state cart show
//! ```

use storefront_state::{CartState, StoreState};
use storefront_state_core::{CartLineItem, VariantId, format_price};

use super::{CommandError, ensure_persisted};

/// Drawer flag change requested by `open`, `close`, or `toggle`.
#[derive(Debug, Clone, Copy)]
pub enum Drawer {
    Open,
    Close,
    Toggle,
}

/// Render the cart as text: one line per item, then totals.
pub fn render(cart: &CartState) -> String {
    let mut out = String::new();

    if cart.items.is_empty() {
        out.push_str("Cart is empty\n");
    }

    for item in &cart.items {
        let variant = [item.size.as_deref(), item.color.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        let label = if variant.is_empty() {
            item.name.clone()
        } else {
            format!("{} ({variant})", item.name)
        };
        out.push_str(&format!(
            "{:<12} {} x{} @ {} = {}\n",
            item.variant_id,
            label,
            item.quantity,
            format_price(item.unit_price()),
            format_price(item.line_total()),
        ));
    }

    out.push_str(&format!(
        "Items: {}  Total: {}  Drawer: {}\n",
        cart.total_items(),
        format_price(cart.total_price()),
        if cart.is_open { "open" } else { "closed" },
    ));
    out
}

/// Print the cart.
pub fn show(state: &StoreState) {
    let text = state.with_cart(|cart| render(cart.state()));

    #[allow(clippy::print_stdout)]
    {
        print!("{text}");
    }
}

/// Add a line to the cart.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn add(state: &StoreState, item: CartLineItem) -> Result<(), CommandError> {
    tracing::info!(variant_id = %item.variant_id, quantity = item.quantity, "Adding cart line");
    state.with_cart(|cart| {
        cart.add_item(item);
        ensure_persisted("Cart", cart.last_persist_error())
    })
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn remove(state: &StoreState, variant: &str) -> Result<(), CommandError> {
    let variant_id = VariantId::new(variant);
    state.with_cart(|cart| {
        if cart.get_item(&variant_id).is_none() {
            tracing::info!(variant_id = %variant_id, "Variant not in cart, nothing to remove");
        }
        cart.remove_item(&variant_id);
        ensure_persisted("Cart", cart.last_persist_error())
    })
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn set_quantity(state: &StoreState, variant: &str, quantity: i64) -> Result<(), CommandError> {
    let variant_id = VariantId::new(variant);
    state.with_cart(|cart| {
        cart.update_quantity(&variant_id, quantity);
        ensure_persisted("Cart", cart.last_persist_error())
    })
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn clear(state: &StoreState) -> Result<(), CommandError> {
    state.with_cart(|cart| {
        cart.clear_cart();
        ensure_persisted("Cart", cart.last_persist_error())
    })
}

/// Change the drawer flag.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn drawer(state: &StoreState, change: Drawer) -> Result<(), CommandError> {
    state.with_cart(|cart| {
        match change {
            Drawer::Open => cart.open_cart(),
            Drawer::Close => cart.close_cart(),
            Drawer::Toggle => cart.toggle_cart(),
        }
        ensure_persisted("Cart", cart.last_persist_error())
    })
}
