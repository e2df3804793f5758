//! Unified error handling.
//!
//! Store operations themselves never fail. `StateError` covers the setup
//! and maintenance paths around them: loading configuration, opening
//! storage, and importing or deleting snapshots.

use thiserror::Error;

use crate::config::ConfigError;
use crate::persist::SnapshotError;
use crate::storage::StorageError;

/// Library-level error type.
#[derive(Debug, Error)]
pub enum StateError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be read, written, or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Result type alias for `StateError`.
pub type Result<T> = std::result::Result<T, StateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_display() {
        let err = StateError::from(StorageError::InvalidKey("a/b".to_string()));
        assert_eq!(err.to_string(), "Storage error: Invalid storage key: \"a/b\"");

        let err = StateError::from(SnapshotError::VersionMismatch {
            found: 3,
            expected: 0,
        });
        assert_eq!(
            err.to_string(),
            "Snapshot error: Snapshot version 3 does not match expected version 0"
        );
    }
}
