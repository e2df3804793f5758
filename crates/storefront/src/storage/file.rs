//! File-backed storage.
//!
//! Each key maps to `<root>/<key>.json`. Writes land in a sibling
//! `.tmp` file first, are flushed with `sync_all`, and are then renamed over
//! the target. Readers see either the previous snapshot or the new one,
//! never a torn write, and a finished write survives power loss.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{StateStorage, StorageError, validate_key};

/// Storage rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "Opened file storage");
        Ok(Self { root })
    }

    /// The directory snapshots are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flush the directory entry so a completed rename survives power loss.
    #[cfg(unix)]
    fn sync_root(&self) -> std::io::Result<()> {
        fs::File::open(&self.root)?.sync_all()
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    fn sync_root(&self) -> std::io::Result<()> {
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

impl StateStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp).map_err(|e| io_error(key, e))?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| io_error(key, e))?;
        drop(file);

        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))?;
        self.sync_root().map_err(|e| io_error(key, e))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
