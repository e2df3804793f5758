//! Storefront State Core - Shared item types.
//!
//! This crate provides the records exchanged between UI collaborators and
//! the persisted stores:
//! - `storefront-state` - Cart and wishlist stores with durable snapshots
//! - `cli` - Command-line inspection and editing of persisted stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no
//! storage access. Items are denormalized snapshots of catalog entities
//! that live outside this workspace.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, cart/wishlist line items, and price helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
