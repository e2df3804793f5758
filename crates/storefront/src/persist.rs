//! Write-through persistence for store state.
//!
//! [`Persisted`] wraps a store's state together with the storage it is
//! mirrored to. Every mutation goes through [`Persisted::mutate`], which
//! writes the new snapshot and then notifies subscribers before returning.
//! A caller that got control back can assume the change is on disk (or that
//! the write failure was logged and recorded, see
//! [`Persisted::last_persist_error`]).
//!
//! # Snapshot format
//!
//! ```json
//! { "state": { "items": [...], "isOpen": false }, "version": 0 }
//! ```
//!
//! Unknown fields are ignored on read. A snapshot whose `version` differs
//! from [`PersistState::VERSION`] is discarded. Decoded state goes through
//! [`PersistState::normalize`] before it is installed, so an imported or
//! hand-edited snapshot cannot break store invariants.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::storage::{StateStorage, StorageError};
use crate::subscription::{Listeners, SubscriptionId};

/// Errors reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Backend read or write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored text is not a valid snapshot.
    #[error("Malformed snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    /// The state could not be serialized.
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The snapshot was written by an incompatible schema version.
    #[error("Snapshot version {found} does not match expected version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

/// State that can be mirrored to storage.
pub trait PersistState:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + 'static
{
    /// Schema version written into every snapshot.
    const VERSION: u32 = 0;

    /// Restore invariants the in-memory operations maintain but a decoded
    /// snapshot may not, such as unique merge keys. Runs on every decode.
    fn normalize(&mut self) {}
}

#[derive(Serialize)]
struct SnapshotRef<'a, S> {
    state: &'a S,
    version: u32,
}

#[derive(Deserialize)]
struct Snapshot<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

/// Encode state as snapshot JSON.
///
/// # Errors
///
/// Returns `SnapshotError::Encode` if serialization fails.
pub fn encode_snapshot<S: PersistState>(state: &S) -> Result<String, SnapshotError> {
    serde_json::to_string(&SnapshotRef {
        state,
        version: S::VERSION,
    })
    .map_err(SnapshotError::Encode)
}

/// Decode snapshot JSON into state.
///
/// # Errors
///
/// Returns `SnapshotError::Decode` for malformed input, or
/// `SnapshotError::VersionMismatch` if the snapshot's version differs.
/// The decoded state is passed through [`PersistState::normalize`].
pub fn decode_snapshot<S: PersistState>(raw: &str) -> Result<S, SnapshotError> {
    let snapshot: Snapshot<S> = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
    if snapshot.version != S::VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: S::VERSION,
        });
    }
    let mut state = snapshot.state;
    state.normalize();
    Ok(state)
}

/// Whether two states would persist differently.
///
/// Compares the serialized form, so values that are not equal to themselves
/// under `PartialEq` (a NaN price) still count as unchanged.
fn differs<S: PersistState>(a: &S, b: &S) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(left), Ok(right)) => left != right,
        _ => a != b,
    }
}

/// A state value mirrored to a storage key.
pub struct Persisted<S: PersistState> {
    key: String,
    state: S,
    storage: Arc<dyn StateStorage>,
    listeners: Listeners<S>,
    last_error: Option<SnapshotError>,
}

impl<S: PersistState> fmt::Debug for Persisted<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<S: PersistState> Persisted<S> {
    /// Load state from `key`, falling back to the default state.
    ///
    /// This is the only path that reads storage. A missing record, an
    /// unreadable record, or a version mismatch all yield `S::default()`.
    #[instrument(skip(storage))]
    pub fn rehydrate(key: &str, storage: Arc<dyn StateStorage>) -> Self {
        let state = match Self::load(key, storage.as_ref()) {
            Ok(Some(state)) => {
                tracing::debug!("Rehydrated store from snapshot");
                state
            }
            Ok(None) => {
                tracing::debug!("No snapshot found, starting empty");
                S::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable snapshot, starting empty");
                S::default()
            }
        };

        Self {
            key: key.to_owned(),
            state,
            storage,
            listeners: Listeners::default(),
            last_error: None,
        }
    }

    fn load(key: &str, storage: &dyn StateStorage) -> Result<Option<S>, SnapshotError> {
        let Some(raw) = storage.get_item(key)? else {
            return Ok(None);
        };
        decode_snapshot(&raw).map(Some)
    }

    /// The storage key this state is mirrored to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current committed state.
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Apply `f` to the state, persisting and notifying if anything changed.
    ///
    /// When `f` leaves the state equal to what it was, nothing is written
    /// and no subscriber is called.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        let before = self.state.clone();
        let output = f(&mut self.state);
        if differs(&self.state, &before) {
            self.commit();
        }
        output
    }

    /// Replace the whole state.
    pub fn replace(&mut self, state: S) {
        self.mutate(|current| *current = state);
    }

    fn commit(&mut self) {
        match self.write() {
            Ok(()) => {
                tracing::debug!(key = %self.key, "Persisted store snapshot");
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to persist store snapshot");
                self.last_error = Some(e);
            }
        }
        self.listeners.notify(&self.state);
    }

    fn write(&self) -> Result<(), SnapshotError> {
        let raw = encode_snapshot(&self.state)?;
        self.storage.set_item(&self.key, &raw)?;
        Ok(())
    }

    /// Serialize the current state as snapshot JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Encode` if serialization fails.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        encode_snapshot(&self.state)
    }

    /// Replace the state from snapshot JSON (write-through).
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the state untouched, if `raw` is not a
    /// valid snapshot for this state's version.
    pub fn restore_from_snapshot(&mut self, raw: &str) -> Result<(), SnapshotError> {
        let state = decode_snapshot(raw)?;
        self.replace(state);
        Ok(())
    }

    /// Delete the persisted record and reset the in-memory state.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Storage` if the record cannot be removed;
    /// the in-memory state is left untouched in that case.
    pub fn clear_storage(&mut self) -> Result<(), SnapshotError> {
        self.storage.remove_item(&self.key)?;
        let changed = differs(&self.state, &S::default());
        self.state = S::default();
        self.last_error = None;
        if changed {
            self.listeners.notify(&self.state);
        }
        Ok(())
    }

    /// The error from the most recent failed write, cleared by the next
    /// successful one.
    #[must_use]
    pub const fn last_persist_error(&self) -> Option<&SnapshotError> {
        self.last_error.as_ref()
    }

    /// Register a callback invoked after each committed change.
    pub fn subscribe(&mut self, callback: impl Fn(&S) + Send + 'static) -> SubscriptionId {
        let id = self.listeners.subscribe(callback);
        tracing::debug!(key = %self.key, subscription = %id, "Registered subscriber");
        id
    }

    /// Remove a callback. Returns `false` if the ID is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::storage::MemoryStorage;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    impl PersistState for Counter {}

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct CounterV2 {
        count: u32,
    }

    impl PersistState for CounterV2 {
        const VERSION: u32 = 2;
    }

    /// Storage whose writes always fail.
    #[derive(Debug)]
    struct ReadOnlyStorage;

    impl StateStorage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_envelope_shape() {
        let json = encode_snapshot(&Counter { count: 3 }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"]["count"], 3);
        assert_eq!(value["version"], 0);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let state: Counter =
            decode_snapshot(r#"{"state":{"count":4,"extra":true},"version":0,"x":1}"#).unwrap();
        assert_eq!(state.count, 4);
    }

    #[test]
    fn test_decode_rejects_version_mismatch() {
        let result = decode_snapshot::<CounterV2>(r#"{"state":{"count":4},"version":0}"#);
        assert!(matches!(
            result,
            Err(SnapshotError::VersionMismatch {
                found: 0,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_mutate_writes_through() {
        let storage = MemoryStorage::new();
        let mut persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(storage.clone()));

        persisted.mutate(|s| s.count += 1);

        let raw = storage.get_item("counter").unwrap().unwrap();
        assert_eq!(decode_snapshot::<Counter>(&raw).unwrap().count, 1);
    }

    #[test]
    fn test_unchanged_mutation_writes_nothing() {
        let storage = MemoryStorage::new();
        let mut persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(storage.clone()));

        persisted.mutate(|_| ());

        assert!(storage.is_empty());
    }

    #[test]
    fn test_rehydrate_from_corrupt_snapshot_is_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("counter", "{not json").unwrap();

        let persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(storage));
        assert_eq!(persisted.state(), &Counter::default());
    }

    #[test]
    fn test_subscribers_see_committed_state_after_write() {
        let storage = MemoryStorage::new();
        let mut persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(storage.clone()));

        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let reader = storage.clone();
        persisted.subscribe(move |state: &Counter| {
            let stored = reader.get_item("counter").unwrap();
            *sink.lock().unwrap() = Some((state.count, stored.is_some()));
        });

        persisted.mutate(|s| s.count = 9);

        assert_eq!(*observed.lock().unwrap(), Some((9, true)));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(ReadOnlyStorage));

        persisted.mutate(|s| s.count = 5);

        assert_eq!(persisted.state().count, 5);
        assert!(matches!(
            persisted.last_persist_error(),
            Some(SnapshotError::Storage(_))
        ));
    }

    #[test]
    fn test_restore_from_bad_snapshot_leaves_state() {
        let mut persisted =
            Persisted::<Counter>::rehydrate("counter", Arc::new(MemoryStorage::new()));
        persisted.mutate(|s| s.count = 2);

        assert!(persisted.restore_from_snapshot("[]").is_err());
        assert_eq!(persisted.state().count, 2);
    }

    #[test]
    fn test_clear_storage_removes_record() {
        let storage = MemoryStorage::new();
        let mut persisted = Persisted::<Counter>::rehydrate("counter", Arc::new(storage.clone()));
        persisted.mutate(|s| s.count = 2);

        persisted.clear_storage().unwrap();

        assert!(storage.get_item("counter").unwrap().is_none());
        assert_eq!(persisted.state().count, 0);
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tags {
        tags: Vec<String>,
    }

    impl PersistState for Tags {
        fn normalize(&mut self) {
            let mut seen = Vec::new();
            self.tags.retain(|tag| {
                let fresh = !seen.contains(tag);
                seen.push(tag.clone());
                fresh
            });
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Reading {
        value: f64,
    }

    impl PersistState for Reading {}

    #[test]
    fn test_decode_normalizes_state() {
        let tags: Tags =
            decode_snapshot(r#"{"state":{"tags":["a","b","a"]},"version":0}"#).unwrap();
        assert_eq!(tags.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_rehydrate_normalizes_state() {
        let storage = MemoryStorage::new();
        storage
            .set_item("tags", r#"{"state":{"tags":["x","x"]},"version":0}"#)
            .unwrap();

        let persisted = Persisted::<Tags>::rehydrate("tags", Arc::new(storage));
        assert_eq!(persisted.state().tags, vec!["x"]);
    }

    #[test]
    fn test_nan_state_noop_does_not_write() {
        let storage = MemoryStorage::new();
        let mut persisted = Persisted::<Reading>::rehydrate("reading", Arc::new(storage.clone()));
        persisted.mutate(|s| s.value = f64::NAN);
        let written = storage.get_item("reading").unwrap();

        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        persisted.subscribe(move |_| *counter.lock().unwrap() += 1);
        persisted.mutate(|_| ());

        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(storage.get_item("reading").unwrap(), written);
    }
}
