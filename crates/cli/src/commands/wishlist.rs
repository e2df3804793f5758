//! Wishlist commands.

use storefront_state::{StoreState, WishlistState};
use storefront_state_core::{ProductId, WishlistItem, format_price};

use super::{CommandError, ensure_persisted};

/// Render the wishlist as text.
pub fn render(wishlist: &WishlistState) -> String {
    let mut out = String::new();

    if wishlist.items.is_empty() {
        out.push_str("Wishlist is empty\n");
    }

    for item in &wishlist.items {
        let price = match item.sale_price {
            Some(sale) => format!("{} (was {})", format_price(sale), format_price(item.price)),
            None => format_price(item.price),
        };
        out.push_str(&format!("{:<12} {} {price}\n", item.product_id, item.name));
    }

    out.push_str(&format!("Saved: {}\n", wishlist.items.len()));
    out
}

/// Print the wishlist.
pub fn show(state: &StoreState) {
    let text = state.with_wishlist(|wishlist| render(wishlist.state()));

    #[allow(clippy::print_stdout)]
    {
        print!("{text}");
    }
}

/// Save a product.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn add(state: &StoreState, item: WishlistItem) -> Result<(), CommandError> {
    state.with_wishlist(|wishlist| {
        if wishlist.is_in_wishlist(&item.product_id) {
            tracing::info!(product_id = %item.product_id, "Already in wishlist");
        }
        wishlist.add_item(item);
        ensure_persisted("Wishlist", wishlist.last_persist_error())
    })
}

/// Remove a saved product.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn remove(state: &StoreState, product: &str) -> Result<(), CommandError> {
    let product_id = ProductId::new(product);
    state.with_wishlist(|wishlist| {
        wishlist.remove_item(&product_id);
        ensure_persisted("Wishlist", wishlist.last_persist_error())
    })
}

/// Print `yes` or `no`.
pub fn contains(state: &StoreState, product: &str) {
    let product_id = ProductId::new(product);
    let saved = state.with_wishlist(|wishlist| wishlist.is_in_wishlist(&product_id));

    #[allow(clippy::print_stdout)]
    {
        println!("{}", if saved { "yes" } else { "no" });
    }
}

/// Save if absent, remove if present.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn toggle(state: &StoreState, item: WishlistItem) -> Result<(), CommandError> {
    let product_id = item.product_id.clone();
    let saved = state.with_wishlist(|wishlist| {
        let saved = wishlist.toggle_item(item);
        ensure_persisted("Wishlist", wishlist.last_persist_error()).map(|()| saved)
    })?;
    tracing::info!(product_id = %product_id, saved, "Toggled wishlist entry");
    Ok(())
}

/// Remove every saved product.
///
/// # Errors
///
/// Returns `CommandError::NotPersisted` if the snapshot write failed.
pub fn clear(state: &StoreState) -> Result<(), CommandError> {
    state.with_wishlist(|wishlist| {
        wishlist.clear_wishlist();
        ensure_persisted("Wishlist", wishlist.last_persist_error())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_sale_price() {
        let wishlist = WishlistState {
            items: vec![
                WishlistItem::new("mug", "Mug", 12.0).with_sale_price(9.0),
                WishlistItem::new("cap", "Cap", 20.0),
            ],
        };

        let text = render(&wishlist);

        assert!(text.contains("Mug $9.00 (was $12.00)"));
        assert!(text.contains("Cap $20.00"));
        assert!(text.ends_with("Saved: 2\n"));
    }
}
