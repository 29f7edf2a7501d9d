//! Document backend contract and bundled implementations.
//!
//! The core depends only on this generic CRUD contract, never on the
//! durability mechanism behind it: a successful `create`/`update` durably
//! persists the bytes such that a subsequent `read` returns them.
//!
//! ## Implementations
//!
//! - [`MemoryBackend`]: in-memory map, cloneable (clones share state)
//! - [`FileBackend`]: one file per document under a base directory
//!
//! Remote backends (key-value stores, blob stores) implement the same trait
//! in their own crates.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Generic document CRUD operations keyed by document identifier.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need shared write access.
pub trait DocumentBackend: Debug + Send + Sync {
    /// True if a document exists under this identifier
    fn exists(&self, id: &str) -> Result<bool>;

    /// Create a new document.
    ///
    /// Fails if a document already exists under this identifier.
    fn create(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Read a document's bytes.
    ///
    /// Returns [`Error::DocumentNotFound`] if no document exists.
    fn read(&self, id: &str) -> Result<Vec<u8>>;

    /// Replace an existing document's bytes.
    ///
    /// Returns [`Error::DocumentNotFound`] if no document exists.
    fn update(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Delete a document.
    ///
    /// Idempotent: deleting a missing document succeeds. Only actual
    /// failures (I/O, permissions) return an error.
    fn delete(&self, id: &str) -> Result<()>;

    /// List all document identifiers held by this backend
    fn list(&self) -> Result<Vec<String>>;
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// A simple in-memory backend.
///
/// Stores documents in a `HashMap` behind `Arc<RwLock<...>>`; clones share
/// the same underlying map, which lets tests reopen a dataset over the same
/// backend state. Useful for unit tests and fully in-memory datasets.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// True if no documents are stored
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl DocumentBackend for MemoryBackend {
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.docs.read().contains_key(id))
    }

    fn create(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let mut docs = self.docs.write();
        if docs.contains_key(id) {
            return Err(Error::backend(format!("document already exists: {}", id)));
        }
        docs.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        self.docs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::document_not_found(id))
    }

    fn update(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let mut docs = self.docs.write();
        match docs.get_mut(id) {
            Some(slot) => {
                *slot = bytes.to_vec();
                Ok(())
            }
            None => Err(Error::document_not_found(id)),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        // Idempotent: ok even if not found
        self.docs.write().remove(id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.docs.read().keys().cloned().collect())
    }
}

// ============================================================================
// FileBackend
// ============================================================================

/// File-based backend: one file per document under a base directory.
///
/// Document identifiers are used as file names directly, so they must be
/// backend-legal (the registry's id scheme guarantees this). Identifiers
/// that would escape the base directory are rejected.
#[derive(Debug, Clone)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Create a file backend rooted at the given directory.
    ///
    /// The directory is created lazily on the first `create`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base directory for this backend
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a document id to a file path.
    ///
    /// Disallows empty ids, absolute paths, and path traversal.
    fn resolve_path(&self, id: &str) -> Result<PathBuf> {
        let p = Path::new(id);
        let is_plain_file = p.components().count() == 1
            && p.components()
                .all(|c| matches!(c, Component::Normal(_)));
        if id.is_empty() || !is_plain_file {
            return Err(Error::backend(format!(
                "invalid document id '{}': must be a plain file name",
                id
            )));
        }
        Ok(self.base_path.join(p))
    }
}

impl DocumentBackend for FileBackend {
    fn exists(&self, id: &str) -> Result<bool> {
        let path = self.resolve_path(id)?;
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve_path(id)?;
        std::fs::create_dir_all(&self.base_path)?;
        // create_new refuses to clobber an existing document
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = options.open(&path)?;
        std::io::Write::write_all(&mut file, bytes)?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.resolve_path(id)?;
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::document_not_found(id)
            } else {
                e.into()
            }
        })
    }

    fn update(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve_path(id)?;
        if !self.exists(id)? {
            return Err(Error::document_not_found(id));
        }
        std::fs::write(&path, bytes)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.resolve_path(id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Idempotent: not found is OK
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            // Base directory not created yet: nothing stored
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        Ok(ids)
    }
}
