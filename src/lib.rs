//! # docgraph
//!
//! Document-backed named-graph storage: maps a set of URI-identified graphs
//! (sets of subject-predicate-object triples) onto a generic document
//! storage backend, tracks which graphs exist, lazily materializes graphs
//! into memory, and reconciles in-memory mutation with persisted state via
//! an explicit flush protocol.
//!
//! This crate provides:
//! - Core types: [`Triple`], [`Graph`]
//! - The [`DocumentBackend`] CRUD contract plus in-memory and file backends
//! - The pluggable [`GraphCodec`] contract with a JSON default
//! - [`GraphRegistry`]: the bijection between graph URIs and document ids
//! - [`DocumentManager`]: dirty tracking and the flush protocol
//! - [`Dataset`]: the public facade with read-through caching
//! - [`AsyncDataset`]: a thin async adapter over the synchronous core
//!
//! ## Design principles
//!
//! 1. **Synchronous core**: every backend-touching operation may block;
//!    async callers use the [`aio`] adapter.
//! 2. **Explicit commit points**: mutation marks state dirty in memory;
//!    nothing hits the backend until `flush()`.
//! 3. **Explicit ownership**: registries, managers, and datasets are plain
//!    constructed values — no process-wide singletons.
//!
//! ## Example
//!
//! ```
//! use docgraph::{Dataset, JsonCodec, MemoryBackend, Triple};
//!
//! # fn main() -> docgraph::Result<()> {
//! let mut dataset = Dataset::open(MemoryBackend::new(), Box::new(JsonCodec::new()))?;
//! dataset.create_graph("http://example.org/g1")?;
//! dataset
//!     .graph_mut("http://example.org/g1")?
//!     .insert(Triple::new("s1", "p1", "o1"));
//! dataset.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod aio;
pub mod backend;
pub mod codec;
pub mod dataset;
pub mod error;
pub mod manager;
pub mod registry;
pub mod triple;

// Re-export main types
pub use aio::AsyncDataset;
pub use backend::{DocumentBackend, FileBackend, MemoryBackend};
pub use codec::{GraphCodec, JsonCodec};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use manager::DocumentManager;
pub use registry::{DocumentIdScheme, GraphRegistry, PercentIdScheme};
pub use triple::{Graph, Triple};

/// Prelude module for convenient imports of the facade and its contracts.
///
/// # Example
///
/// ```
/// use docgraph::prelude::*;
///
/// let dataset = Dataset::open(MemoryBackend::new(), Box::new(JsonCodec::new()));
/// ```
pub mod prelude {
    pub use crate::backend::{DocumentBackend, FileBackend, MemoryBackend};
    pub use crate::codec::{GraphCodec, JsonCodec};
    pub use crate::dataset::Dataset;
    pub use crate::error::{Error, Result};
    pub use crate::triple::{Graph, Triple};
}
