//! Durable local storage for the cart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Errors from reading or writing saved cart contents.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("saved cart is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cart storage lock poisoned")]
    Poisoned,
}

/// Where the serialized cart lives between runs.
pub trait CartStorage {
    /// Saved contents, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage exists but cannot be read.
    fn load(&self) -> Result<Option<String>, CartStorageError>;

    /// Replace the saved contents.
    ///
    /// # Errors
    ///
    /// Returns an error when the contents cannot be written.
    fn save(&self, contents: &str) -> Result<(), CartStorageError>;
}

/// Cart saved as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>, CartStorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), CartStorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written cart.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Cart saved in memory. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that starts with the given saved contents.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Currently saved contents.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, CartStorageError> {
        Ok(self
            .contents
            .lock()
            .map_err(|_| CartStorageError::Poisoned)?
            .clone())
    }

    fn save(&self, contents: &str) -> Result<(), CartStorageError> {
        *self.contents.lock().map_err(|_| CartStorageError::Poisoned)? = Some(contents.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("cart.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested/dir/cart.json"));

        storage.save("[]").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("nested/dir/cart.json.tmp").exists());
    }

    #[test]
    fn test_memory_storage_clones_share_contents() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.save("[1]").unwrap();
        assert_eq!(view.contents().as_deref(), Some("[1]"));
    }
}
