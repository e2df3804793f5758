//! Integration tests for the storefront state stores.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-state-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart behaviour across store restarts
//! - `wishlist_persistence` - Wishlist behaviour across store restarts
//! - `store_state` - The shared handle and configuration wiring
//!
//! Tests run against the real file backend in a throwaway directory, so a
//! "restart" is simply dropping a store and opening a new one on the same
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use storefront_state::{FileStorage, StateStorage};

/// A uniquely named snapshot directory, removed on drop.
pub struct TempStateDir {
    path: PathBuf,
}

impl TempStateDir {
    /// Create a fresh directory under the system temp dir.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("storefront-state-it-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("failed to create temp state dir");
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open file storage rooted at this directory.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be opened.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn storage(&self) -> Arc<dyn StateStorage> {
        Arc::new(FileStorage::open(&self.path).expect("failed to open file storage"))
    }

    /// Path of the snapshot file for `key`.
    #[must_use]
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.path.join(format!("{key}.json"))
    }

    /// Raw snapshot contents for `key`, if written.
    #[must_use]
    pub fn read_snapshot(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.snapshot_path(key)).ok()
    }
}

impl Default for TempStateDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempStateDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
