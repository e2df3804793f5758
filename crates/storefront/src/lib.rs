//! Storefront State library.
//!
//! Persisted, observable cart and wishlist stores shared by the storefront's
//! UI widgets (product cards, cart drawer, add-to-cart and wishlist buttons).
//!
//! # Architecture
//!
//! - [`storage`] - Durable key/value backends (file, memory)
//! - [`persist`] - Write-through snapshot decorator around a store's state
//! - [`subscription`] - Change callbacks invoked after each committed mutation
//! - [`cart`], [`wishlist`] - The two stores
//! - [`state`] - One-instance-per-kind handle injected into consumers
//!
//! All store operations run to completion synchronously on the caller's
//! thread. Absent items are no-ops, never errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod persist;
pub mod state;
pub mod storage;
pub mod subscription;
pub mod wishlist;

pub use cart::{CART_STORAGE_KEY, CartState, CartStore};
pub use config::{ConfigError, StateConfig, StorageBackend};
pub use error::StateError;
pub use persist::{PersistState, Persisted, SnapshotError};
pub use state::StoreState;
pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError};
pub use subscription::SubscriptionId;
pub use wishlist::{WISHLIST_STORAGE_KEY, WishlistState, WishlistStore};
