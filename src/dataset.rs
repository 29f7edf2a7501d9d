//! Dataset facade: graph enumeration, lookup with lazy caching, flush.
//!
//! The dataset owns a registry, a document manager, and an in-memory cache
//! of materialized graphs. Lookup is read-through: once a graph is cached,
//! the cache is authoritative (it may contain uncommitted mutations) and the
//! backend is consulted only on a miss.
//!
//! ## State machine per graph
//!
//! `Unregistered → Registered(not loaded) → Loaded(clean) → Loaded(dirty)
//! → Loaded(clean)` (after flush) `→ Unregistered` (after removal).
//!
//! ## Sharing discipline
//!
//! All mutating operations take `&mut self`; the core provides no internal
//! locking. Serializing concurrent writers per graph is the caller's job —
//! see [`crate::aio::AsyncDataset`] for a coarse-grained async wrapper.

use crate::backend::DocumentBackend;
use crate::codec::GraphCodec;
use crate::error::{Error, Result};
use crate::manager::DocumentManager;
use crate::registry::{DocumentIdScheme, GraphRegistry};
use crate::triple::Graph;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One materialized graph plus its reconciliation state
#[derive(Debug)]
struct CacheEntry {
    graph: Graph,
    /// True when the in-memory projection has mutations the manager has not
    /// been handed yet
    dirty: bool,
}

/// Public facade over document-backed named-graph storage.
///
/// Explicitly constructed and explicitly owned; build as many independent
/// datasets in one process as you need (each over its own backend, or over
/// clones of a shared one).
#[derive(Debug)]
pub struct Dataset<B> {
    registry: GraphRegistry,
    manager: DocumentManager<B>,
    /// Graph URI → materialized projection
    cache: HashMap<String, CacheEntry>,
}

impl<B: DocumentBackend> Dataset<B> {
    /// Open a dataset over a backend, rebuilding the registry from the
    /// documents the backend already holds.
    ///
    /// Identifiers the id scheme cannot invert are not graph documents and
    /// are skipped (with a warning).
    pub fn open(backend: B, codec: Box<dyn GraphCodec>) -> Result<Self> {
        Self::open_with_registry(backend, codec, GraphRegistry::new())
    }

    /// Open a dataset with a custom id scheme
    pub fn open_with_scheme(
        backend: B,
        codec: Box<dyn GraphCodec>,
        scheme: Box<dyn DocumentIdScheme>,
    ) -> Result<Self> {
        Self::open_with_registry(backend, codec, GraphRegistry::with_scheme(scheme))
    }

    fn open_with_registry(
        backend: B,
        codec: Box<dyn GraphCodec>,
        mut registry: GraphRegistry,
    ) -> Result<Self> {
        for id in backend.list()? {
            match registry.scheme().graph_uri(&id) {
                Some(uri) => {
                    registry.register_graph(&uri)?;
                }
                None => {
                    warn!(document_id = %id, "skipping document with non-graph identifier");
                }
            }
        }
        debug!(graphs = registry.len(), "opened dataset");
        Ok(Self {
            registry,
            manager: DocumentManager::new(backend, codec),
            cache: HashMap::new(),
        })
    }

    /// True iff a registry entry exists for this URI
    pub fn has_graph(&self, uri: &str) -> bool {
        self.registry.has_graph(uri)
    }

    /// Snapshot of all registered graph URIs; order is irrelevant
    pub fn graph_uris(&self) -> Vec<String> {
        self.registry.list_graph_uris()
    }

    /// Borrow the registry
    pub fn registry(&self) -> &GraphRegistry {
        &self.registry
    }

    /// Borrow the document manager
    pub fn manager(&self) -> &DocumentManager<B> {
        &self.manager
    }

    /// True if this graph has uncommitted in-memory mutations
    pub fn is_dirty(&self, uri: &str) -> bool {
        self.cache.get(uri).is_some_and(|entry| entry.dirty)
    }

    /// Look up a graph by URI, materializing it on first access.
    ///
    /// The returned projection may contain uncommitted mutations.
    ///
    /// # Errors
    ///
    /// [`Error::GraphNotFound`] if the URI is not registered — with no side
    /// effects on registry, cache, or backend.
    pub fn graph(&mut self, uri: &str) -> Result<&Graph> {
        self.materialize(uri).map(|entry| &entry.graph)
    }

    /// Look up a graph for mutation, marking it dirty.
    ///
    /// This is the only mutation path for graph content; the registry is
    /// never handed out mutably.
    pub fn graph_mut(&mut self, uri: &str) -> Result<&mut Graph> {
        let entry = self.materialize(uri)?;
        entry.dirty = true;
        Ok(&mut entry.graph)
    }

    fn materialize(&mut self, uri: &str) -> Result<&mut CacheEntry> {
        if !self.registry.has_graph(uri) {
            return Err(Error::graph_not_found(uri));
        }
        let Self {
            registry,
            manager,
            cache,
        } = self;
        match cache.entry(uri.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let id = registry.document_id_for(uri);
                let triples = manager.load_graph(&id)?;
                debug!(uri = %uri, triples = triples.len(), "materialized graph");
                Ok(slot.insert(CacheEntry {
                    graph: Graph::with_triples(uri, triples),
                    dirty: false,
                }))
            }
        }
    }

    /// Eager enumeration of every graph is intentionally unsupported.
    ///
    /// Materializing all graphs at once is a non-goal; iterate
    /// [`graph_uris`](Self::graph_uris) and fetch lazily instead. This
    /// always returns [`Error::Unsupported`].
    pub fn graphs(&self) -> Result<Vec<&Graph>> {
        Err(Error::unsupported(
            "eager enumeration of all graphs; iterate graph_uris() and fetch lazily",
        ))
    }

    /// Register a graph URI and stage an empty document for it.
    ///
    /// Idempotent for an already-registered URI.
    ///
    /// # Errors
    ///
    /// [`Error::RegistryCollision`] when a different URI already occupies
    /// the derived document id.
    pub fn create_graph(&mut self, uri: &str) -> Result<()> {
        if self.registry.has_graph(uri) {
            return Ok(());
        }
        let id = self.registry.register_graph(uri)?;
        let graph = Graph::new(uri);
        self.manager.save_graph(&id, &graph)?;
        self.cache.insert(
            uri.to_string(),
            CacheEntry {
                graph,
                dirty: false,
            },
        );
        debug!(uri = %uri, document_id = %id, "created graph");
        Ok(())
    }

    /// Destroy a graph: unregister it, then delete its backing document.
    ///
    /// The registry entry goes first so it never points at a deleted
    /// document.
    ///
    /// # Errors
    ///
    /// [`Error::GraphNotFound`] if the URI is not registered.
    pub fn remove_graph(&mut self, uri: &str) -> Result<()> {
        let Some(id) = self.registry.unregister_graph(uri) else {
            return Err(Error::graph_not_found(uri));
        };
        self.cache.remove(uri);
        self.manager.delete_document(&id)?;
        debug!(uri = %uri, document_id = %id, "removed graph");
        Ok(())
    }

    /// Drop the cached projection for a URI, discarding any uncommitted
    /// mutations. Returns `true` if an entry was dropped.
    pub fn invalidate(&mut self, uri: &str) -> bool {
        self.cache.remove(uri).is_some()
    }

    /// Commit all pending in-memory mutations to the backend.
    ///
    /// Every dirty cache entry is staged into the document manager first,
    /// then the manager commits to the backend — staging strictly precedes
    /// the commit, or mutations would be lost. Multiple mutations to one
    /// cached graph between flushes result in exactly one backend write
    /// reflecting the final triple set.
    ///
    /// # Errors
    ///
    /// [`Error::FlushPartialFailure`] if some documents could not be
    /// written; those stay pending in the manager (and their cache entries
    /// stay dirty) and are retried by the next flush, while successful
    /// documents remain committed.
    pub fn flush(&mut self) -> Result<()> {
        let Self {
            registry,
            manager,
            cache,
        } = self;
        for (uri, entry) in cache.iter_mut() {
            if entry.dirty {
                let id = registry.document_id_for(uri);
                manager.save_graph(&id, &entry.graph)?;
            }
        }
        let result = manager.flush();
        match &result {
            Ok(()) => {
                for entry in cache.values_mut() {
                    entry.dirty = false;
                }
            }
            Err(Error::FlushPartialFailure { failures }) => {
                // Dirty flags clear only for documents that actually
                // committed, so is_dirty keeps reporting unpersisted graphs.
                let failed: HashSet<&str> =
                    failures.iter().map(|(id, _)| id.as_str()).collect();
                for (uri, entry) in cache.iter_mut() {
                    if entry.dirty && !failed.contains(registry.document_id_for(uri).as_str()) {
                        entry.dirty = false;
                    }
                }
            }
            Err(_) => {}
        }
        result
    }
}
