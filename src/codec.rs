//! Graph codec contract and the bundled JSON implementation.
//!
//! A codec translates between a triple set and an opaque document payload.
//! The contract is the round-trip law: `decode(encode(g))` is set-equal to
//! `g` for any finite graph, including the empty graph. Serialization order
//! is irrelevant since a graph is a set.
//!
//! Codecs are format-pluggable: a [`crate::manager::DocumentManager`] takes
//! one at construction. RDF text formats (Turtle, N-Triples, ...) belong to
//! external crates; the bundled default is a serde_json codec.

use crate::error::Result;
use crate::triple::Triple;
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Pluggable encoding between a triple set and document bytes.
pub trait GraphCodec: Debug + Send + Sync {
    /// Serialize a triple set to a document payload
    fn encode(&self, triples: &BTreeSet<Triple>) -> Result<Vec<u8>>;

    /// Deserialize a document payload back into a triple set.
    ///
    /// Duplicate statements in the payload collapse into one; order is
    /// ignored.
    fn decode(&self, bytes: &[u8]) -> Result<BTreeSet<Triple>>;
}

/// Default codec: a JSON array of `{subject, predicate, object}` objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self
    }
}

impl GraphCodec for JsonCodec {
    fn encode(&self, triples: &BTreeSet<Triple>) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(triples)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<BTreeSet<Triple>> {
        let triples: Vec<Triple> = serde_json::from_slice(bytes)?;
        Ok(triples.into_iter().collect())
    }
}
