//! Async adapter over the synchronous core.
//!
//! The core is synchronous and blocking by design; callers needing
//! non-blocking behavior wrap it in an asynchronous execution facility. This
//! module is that thin adapter: every method runs its sync counterpart on
//! the tokio blocking pool and resolves exactly once with the same typed
//! result. No additional semantics, no per-graph coordination — the wrapper
//! mutex serializes whole operations.
//!
//! Because materialized graphs cannot be borrowed across the mutex,
//! [`AsyncDataset::graph`] returns an owned snapshot and mutation goes
//! through a closure ([`AsyncDataset::update`]).

use crate::backend::DocumentBackend;
use crate::codec::GraphCodec;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::triple::Graph;
use parking_lot::Mutex;
use std::sync::Arc;

/// Async facade over [`Dataset`].
///
/// Cloneable; clones share the same underlying dataset.
#[derive(Debug, Clone)]
pub struct AsyncDataset<B> {
    inner: Arc<Mutex<Dataset<B>>>,
}

impl<B: DocumentBackend + 'static> AsyncDataset<B> {
    /// Wrap an already-opened dataset
    pub fn new(dataset: Dataset<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dataset)),
        }
    }

    /// Open a dataset over a backend without blocking the async runtime
    pub async fn open(backend: B, codec: Box<dyn GraphCodec>) -> Result<Self> {
        let dataset =
            run_blocking(move || Dataset::open(backend, codec)).await?;
        Ok(Self::new(dataset))
    }

    /// Run a closure against the locked dataset on the blocking pool
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Dataset<B>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        run_blocking(move || {
            let mut dataset = inner.lock();
            f(&mut dataset)
        })
        .await
    }

    /// True iff a registry entry exists for this URI
    pub async fn has_graph(&self, uri: &str) -> Result<bool> {
        let uri = uri.to_string();
        self.run(move |ds| Ok(ds.has_graph(&uri))).await
    }

    /// Snapshot of all registered graph URIs
    pub async fn graph_uris(&self) -> Result<Vec<String>> {
        self.run(|ds| Ok(ds.graph_uris())).await
    }

    /// Owned snapshot of a graph, materializing it on first access
    pub async fn graph(&self, uri: &str) -> Result<Graph> {
        let uri = uri.to_string();
        self.run(move |ds| ds.graph(&uri).cloned()).await
    }

    /// Mutate a graph through a closure; the graph is marked dirty.
    pub async fn update<F>(&self, uri: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Graph) + Send + 'static,
    {
        let uri = uri.to_string();
        self.run(move |ds| {
            f(ds.graph_mut(&uri)?);
            Ok(())
        })
        .await
    }

    /// Register a graph URI and stage an empty document for it
    pub async fn create_graph(&self, uri: &str) -> Result<()> {
        let uri = uri.to_string();
        self.run(move |ds| ds.create_graph(&uri)).await
    }

    /// Unregister a graph and delete its backing document
    pub async fn remove_graph(&self, uri: &str) -> Result<()> {
        let uri = uri.to_string();
        self.run(move |ds| ds.remove_graph(&uri)).await
    }

    /// Drop the cached projection for a URI
    pub async fn invalidate(&self, uri: &str) -> Result<bool> {
        let uri = uri.to_string();
        self.run(move |ds| Ok(ds.invalidate(&uri))).await
    }

    /// Commit all pending in-memory mutations to the backend
    pub async fn flush(&self) -> Result<()> {
        self.run(|ds| ds.flush()).await
    }
}

/// Run a blocking closure on the tokio blocking pool.
///
/// Panics inside the closure propagate; task cancellation surfaces as a
/// backend error.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(Error::backend("blocking task was cancelled")),
    }
}
