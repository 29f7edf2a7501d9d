//! Graph registry: the bijection between graph URIs and document ids.
//!
//! ## Invariants
//!
//! - For every registered graph there is exactly one entry, and
//!   `document id = scheme.document_id(uri)` for a fixed, deterministic
//!   scheme.
//! - No two distinct URIs may occupy the same document id: a collision
//!   refuses registration and leaves the existing entry untouched.
//! - The registry never deletes documents itself; unregistering only drops
//!   the entry and hands the document id back to the caller, which deletes
//!   the document *after* this call so no entry ever points at a deleted
//!   document.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;

/// Deterministic mapping between graph URIs and backend-legal document ids.
///
/// `document_id` must be pure, total, and injective over every URI the
/// registry will be asked to resolve. `graph_uri` is the inverse; it lets a
/// dataset rebuild its registry from `backend.list()` and returns `None` for
/// identifiers that are not graph documents.
pub trait DocumentIdScheme: Debug + Send + Sync {
    /// Derive the document id for a graph URI
    fn document_id(&self, uri: &str) -> String;

    /// Recover the graph URI from a document id, if it is one of ours
    fn graph_uri(&self, document_id: &str) -> Option<String>;
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// True for bytes that pass through the percent scheme unescaped
fn is_plain(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

/// Default scheme: byte-wise percent escaping.
///
/// `[A-Za-z0-9._-]` pass through; every other byte becomes `%XX` (uppercase
/// hex). The output contains no path separators or other characters that are
/// illegal in file or object names, and the mapping is injective and
/// invertible.
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentIdScheme;

impl DocumentIdScheme for PercentIdScheme {
    fn document_id(&self, uri: &str) -> String {
        let mut out = String::with_capacity(uri.len());
        for &b in uri.as_bytes() {
            if is_plain(b) {
                out.push(b as char);
            } else {
                out.push('%');
                out.push(HEX_UPPER[(b >> 4) as usize] as char);
                out.push(HEX_UPPER[(b & 0x0F) as usize] as char);
            }
        }
        out
    }

    fn graph_uri(&self, document_id: &str) -> Option<String> {
        let bytes = document_id.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'%' => {
                    let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16))?;
                    let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16))?;
                    out.push((hi as u8) << 4 | lo as u8);
                    i += 3;
                }
                b if is_plain(b) => {
                    out.push(b);
                    i += 1;
                }
                _ => return None,
            }
        }
        let uri = String::from_utf8(out).ok()?;
        // Only canonical ids invert: lowercase hex or escapes of plain bytes
        // would decode to a URI whose id is a *different* string, leaving the
        // registry pointing at a document that is not there.
        if self.document_id(&uri) != document_id {
            return None;
        }
        Some(uri)
    }
}

/// Registry mapping graph URIs to document identifiers.
///
/// Explicitly constructed and explicitly owned — no process-wide singleton.
/// A dataset holds exactly one registry; multiple independent datasets can
/// coexist in one process.
#[derive(Debug)]
pub struct GraphRegistry {
    scheme: Box<dyn DocumentIdScheme>,
    /// Forward map: graph URI → document id
    uri_to_id: HashMap<String, String>,
    /// Reverse map: document id → graph URI (collision guard)
    id_to_uri: HashMap<String, String>,
}

impl Default for GraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphRegistry {
    /// Create an empty registry with the default [`PercentIdScheme`]
    pub fn new() -> Self {
        Self::with_scheme(Box::new(PercentIdScheme))
    }

    /// Create an empty registry with a custom id scheme
    pub fn with_scheme(scheme: Box<dyn DocumentIdScheme>) -> Self {
        Self {
            scheme,
            uri_to_id: HashMap::new(),
            id_to_uri: HashMap::new(),
        }
    }

    /// The scheme this registry derives document ids with
    pub fn scheme(&self) -> &dyn DocumentIdScheme {
        self.scheme.as_ref()
    }

    /// Derive the document id for a URI.
    ///
    /// Pure and total; does not consult or mutate the registry state.
    pub fn document_id_for(&self, uri: &str) -> String {
        self.scheme.document_id(uri)
    }

    /// True iff an entry exists for this URI
    pub fn has_graph(&self, uri: &str) -> bool {
        self.uri_to_id.contains_key(uri)
    }

    /// Register a graph URI, returning its document id.
    ///
    /// Idempotent: registering an already-present URI returns the same id.
    ///
    /// # Errors
    ///
    /// [`Error::RegistryCollision`] when a *different* URI already occupies
    /// the derived document id; the existing entry is untouched.
    pub fn register_graph(&mut self, uri: &str) -> Result<String> {
        if let Some(id) = self.uri_to_id.get(uri) {
            return Ok(id.clone());
        }
        let id = self.scheme.document_id(uri);
        if let Some(existing) = self.id_to_uri.get(&id) {
            return Err(Error::registry_collision(uri, existing, id.clone()));
        }
        self.uri_to_id.insert(uri.to_string(), id.clone());
        self.id_to_uri.insert(id.clone(), uri.to_string());
        Ok(id)
    }

    /// Remove the entry for a URI, returning the document id it pointed at.
    ///
    /// Returns `None` if the URI was not registered. Deleting the backing
    /// document is the document manager's responsibility, ordered after
    /// this call.
    pub fn unregister_graph(&mut self, uri: &str) -> Option<String> {
        let id = self.uri_to_id.remove(uri)?;
        self.id_to_uri.remove(&id);
        Some(id)
    }

    /// Snapshot of all registered graph URIs; order is irrelevant
    pub fn list_graph_uris(&self) -> Vec<String> {
        self.uri_to_id.keys().cloned().collect()
    }

    /// Number of registered graphs
    pub fn len(&self) -> usize {
        self.uri_to_id.len()
    }

    /// True if no graphs are registered
    pub fn is_empty(&self) -> bool {
        self.uri_to_id.is_empty()
    }
}
