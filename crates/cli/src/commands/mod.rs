//! Subcommand implementations.
//!
//! Store operations never fail on their own; a failed snapshot write is
//! recorded on the store, so every mutating command checks for one before
//! reporting success.

use storefront_state::SnapshotError;
use storefront_state_core::{CartLineItem, WishlistItem};
use thiserror::Error;

use crate::ProductArgs;

pub mod cart;
pub mod snapshot;
pub mod wishlist;

/// Errors surfaced by subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The change was applied in memory but could not be written.
    #[error("{store} change was not saved: {reason}")]
    NotPersisted { store: &'static str, reason: String },

    /// Snapshot import, export, or reset failed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Reading an import file failed.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fail if the store recorded a write error for the last mutation.
fn ensure_persisted(
    store: &'static str,
    last_error: Option<&SnapshotError>,
) -> Result<(), CommandError> {
    match last_error {
        Some(e) => Err(CommandError::NotPersisted {
            store,
            reason: e.to_string(),
        }),
        None => Ok(()),
    }
}

/// Build a cart line from command-line arguments.
pub fn cart_line(
    product: ProductArgs,
    variant: String,
    quantity: i64,
    size: Option<String>,
    color: Option<String>,
) -> CartLineItem {
    let mut item = CartLineItem::new(product.product, variant, product.name, product.price, quantity)
        .with_image(product.image)
        .with_slug(product.slug);
    item.sale_price = product.sale_price;
    item.size = size;
    item.color = color;
    item
}

/// Build a wishlist entry from command-line arguments.
pub fn wishlist_item(product: ProductArgs) -> WishlistItem {
    let mut item = WishlistItem::new(product.product, product.name, product.price)
        .with_image(product.image)
        .with_slug(product.slug);
    item.sale_price = product.sale_price;
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(sale_price: Option<f64>) -> ProductArgs {
        ProductArgs {
            product: "tee".to_string(),
            name: "Tee".to_string(),
            price: 20.0,
            sale_price,
            image: "/tee.jpg".to_string(),
            slug: "tee".to_string(),
        }
    }

    #[test]
    fn test_cart_line_from_args() {
        let item = cart_line(args(Some(15.0)), "tee-m".to_string(), 2, Some("M".to_string()), None);
        assert_eq!(item.id, "tee-tee-m");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.sale_price, Some(15.0));
        assert_eq!(item.size.as_deref(), Some("M"));
        assert_eq!(item.color, None);
    }

    #[test]
    fn test_wishlist_item_from_args() {
        let item = wishlist_item(args(None));
        assert_eq!(item.product_id.as_str(), "tee");
        assert_eq!(item.sale_price, None);
        assert_eq!(item.image, "/tee.jpg");
    }

    #[test]
    fn test_ensure_persisted() {
        assert!(ensure_persisted("Cart", None).is_ok());

        let err = SnapshotError::VersionMismatch {
            found: 1,
            expected: 0,
        };
        let result = ensure_persisted("Cart", Some(&err));
        assert!(matches!(
            result,
            Err(CommandError::NotPersisted { store: "Cart", .. })
        ));
    }
}
