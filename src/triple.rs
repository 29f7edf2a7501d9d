//! Triple and Graph data model.
//!
//! A [`Triple`] is a `(subject, predicate, object)` statement over opaque
//! semantic identifiers; equality is structural. A [`Graph`] is a named,
//! unordered set of triples identified by a URI — two graphs with the same
//! URI are the same logical entity.
//!
//! Triples are kept in a `BTreeSet` so iteration (and therefore encoding)
//! is deterministic while equality stays set-based.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A `(subject, predicate, object)` statement, the atomic unit of a graph.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject identifier
    pub subject: String,
    /// Predicate identifier
    pub predicate: String,
    /// Object identifier or value
    pub object: String,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

/// A named, unordered set of [`Triple`]s identified by a URI.
///
/// The URI is fixed at construction; all content mutation goes through the
/// set accessors. Equality compares both the URI and the triple set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    uri: String,
    triples: BTreeSet<Triple>,
}

impl Graph {
    /// Create an empty graph with the given URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            triples: BTreeSet::new(),
        }
    }

    /// Create a graph from an existing triple collection
    pub fn with_triples(uri: impl Into<String>, triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            uri: uri.into(),
            triples: triples.into_iter().collect(),
        }
    }

    /// The URI identifying this graph
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Insert a triple. Returns `true` if it was not already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Remove a triple. Returns `true` if it was present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    /// True if the triple is present
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Number of triples in the graph
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// True if the graph has no triples
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate the triples in deterministic order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Remove all triples
    pub fn clear(&mut self) {
        self.triples.clear()
    }

    /// Borrow the underlying triple set
    pub fn triples(&self) -> &BTreeSet<Triple> {
        &self.triples
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter)
    }
}
