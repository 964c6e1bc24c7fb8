//! Whole-document JSON store with atomic swap writes
//!
//! Documents are rewritten in full on every persist: the new content goes to
//! a temp file in the target directory first and is renamed over the old
//! document, so a crash mid-write leaves the previous document intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use wishbot_domain::{Result, WishBotError};

/// One JSON document on disk
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Create a store for the given document path. Nothing is touched on
    /// disk until the first load or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the document, or `None` when it does not exist yet.
    ///
    /// # Errors
    /// Returns `WishBotError::Storage` when the document exists but cannot
    /// be read or parsed.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            WishBotError::Storage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let value = serde_json::from_str(&contents).map_err(|e| {
            WishBotError::Storage(format!("Invalid JSON in {}: {}", self.path.display(), e))
        })?;

        Ok(Some(value))
    }

    /// Load the document, falling back to `T::default()` when missing.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Persist the full document atomically (write temp file, then rename
    /// over the target).
    ///
    /// # Errors
    /// Returns `WishBotError::Storage` on serialization or I/O failure.
    pub fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| WishBotError::Storage(format!("Failed to serialize document: {}", e)))?;

        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
            WishBotError::Storage(format!("Failed to create temp file in {}: {}", dir.display(), e))
        })?;

        temp.write_all(&json).map_err(|e| {
            WishBotError::Storage(format!("Failed to write temp document: {}", e))
        })?;

        temp.persist(&self.path).map_err(|e| {
            WishBotError::Storage(format!("Failed to swap {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}
