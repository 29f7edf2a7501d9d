//! Document manager: write-back orchestration between codec and backend.
//!
//! The manager is the sole owner of backend documents. `save_graph` is cheap
//! and in-memory (encode now, mark dirty); `flush` is the expensive,
//! I/O-bound commit point. Separating the two batches backend round-trips
//! and lets callers control commit points explicitly.
//!
//! Flush is best-effort per document: a failure on one document does not
//! prevent the others from being attempted, and the aggregate failure set is
//! reported in one error. Flush is not atomic across documents — a crash
//! mid-flush may leave some documents updated and others not.

use crate::backend::DocumentBackend;
use crate::codec::GraphCodec;
use crate::error::{Error, Result};
use crate::triple::{Graph, Triple};
use std::collections::BTreeSet;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Create-or-update a single document
fn write_document<B: DocumentBackend>(backend: &B, id: &str, bytes: &[u8]) -> Result<()> {
    if backend.exists(id)? {
        backend.update(id, bytes)
    } else {
        backend.create(id, bytes)
    }
}

/// Orchestrates registry-issued document ids against backend CRUD, tracking
/// dirty documents and committing them on [`flush`](DocumentManager::flush).
///
/// The codec is a capability parameter supplied at construction; the manager
/// never assumes a concrete format.
#[derive(Debug)]
pub struct DocumentManager<B> {
    backend: B,
    codec: Box<dyn GraphCodec>,
    /// Pending writes: document id → encoded bytes awaiting flush
    dirty: HashMap<String, Vec<u8>>,
}

impl<B: DocumentBackend> DocumentManager<B> {
    /// Create a manager over a backend with the given codec
    pub fn new(backend: B, codec: Box<dyn GraphCodec>) -> Self {
        Self {
            backend,
            codec,
            dirty: HashMap::new(),
        }
    }

    /// Borrow the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True if a document exists, pending or persisted.
    ///
    /// Stays consistent with the registry's `has_graph` for any id the
    /// registry issued and saved through this manager.
    pub fn has_document(&self, id: &str) -> Result<bool> {
        if self.dirty.contains_key(id) {
            return Ok(true);
        }
        self.backend.exists(id)
    }

    /// Load and decode a document into a triple set.
    ///
    /// Pending (unflushed) bytes win over persisted state so a reload after
    /// `save_graph` observes the save.
    ///
    /// # Errors
    ///
    /// - [`Error::DocumentNotFound`] if the backend has no such document
    /// - [`Error::DocumentCorrupt`] if the codec cannot decode the bytes
    pub fn load_graph(&self, id: &str) -> Result<BTreeSet<Triple>> {
        if let Some(bytes) = self.dirty.get(id) {
            return self.decode(id, bytes);
        }
        let bytes = self.backend.read(id)?;
        debug!(document_id = %id, size = bytes.len(), "loaded document from backend");
        self.decode(id, &bytes)
    }

    fn decode(&self, id: &str, bytes: &[u8]) -> Result<BTreeSet<Triple>> {
        self.codec
            .decode(bytes)
            .map_err(|e| Error::document_corrupt(id, e.to_string()))
    }

    /// Encode a graph and mark its document dirty.
    ///
    /// Write-back: no backend I/O happens until [`flush`](Self::flush).
    pub fn save_graph(&mut self, id: &str, graph: &Graph) -> Result<()> {
        let bytes = self.codec.encode(graph.triples())?;
        self.dirty.insert(id.to_string(), bytes);
        Ok(())
    }

    /// Remove both pending and persisted state for a document.
    ///
    /// Idempotent if the document is already absent.
    pub fn delete_document(&mut self, id: &str) -> Result<()> {
        self.dirty.remove(id);
        self.backend.delete(id)
    }

    /// Number of documents awaiting flush
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Commit every dirty document to the backend.
    ///
    /// Documents are attempted in unspecified order; each success clears
    /// that document's dirty state immediately, so documents that failed
    /// stay pending and a later flush retries exactly those.
    ///
    /// # Errors
    ///
    /// [`Error::FlushPartialFailure`] listing each document that could not
    /// be written, with its cause. Documents that succeeded remain
    /// committed.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        let pending: Vec<String> = self.dirty.keys().cloned().collect();
        debug!(count = pending.len(), "flushing dirty documents");

        let mut failures = Vec::new();
        for id in pending {
            let result = match self.dirty.get(&id) {
                Some(bytes) => write_document(&self.backend, &id, bytes),
                None => continue,
            };
            match result {
                Ok(()) => {
                    self.dirty.remove(&id);
                }
                Err(e) => {
                    warn!(document_id = %id, error = %e, "failed to flush document");
                    failures.push((id, e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::FlushPartialFailure { failures })
        }
    }
}
