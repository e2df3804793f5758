//! Core types for the storefront state stores.
//!
//! This module provides type-safe wrappers for catalog references and the
//! line items held by the cart and wishlist.

pub mod id;
pub mod item;
pub mod price;

pub use id::*;
pub use item::{CartLineItem, WishlistItem};
pub use price::{PriceError, amount_serde, format_price, parse_price};
