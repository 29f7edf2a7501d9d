//! Error types for docgraph

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the graph storage core.
///
/// Every failure is returned as a typed result to the immediate caller;
/// nothing is swallowed and nothing is retried here. Retry policy, if any,
/// belongs to the backend adapter or a surrounding resilience layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested graph URI has no registry entry
    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    /// Registry entry exists but the backend has no matching document.
    ///
    /// Indicates registry/backend desynchronization; surfaced, not
    /// auto-repaired.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The codec failed to decode backend bytes for this document
    #[error("Document corrupt: {id}: {detail}")]
    DocumentCorrupt {
        /// Offending document identifier
        id: String,
        /// Decoder failure description
        detail: String,
    },

    /// Two distinct graph URIs would normalize to the same document
    /// identifier. Registration is refused; the existing entry is untouched.
    #[error("Registry collision: '{uri}' and '{existing}' both map to document id '{document_id}'")]
    RegistryCollision {
        /// URI whose registration was refused
        uri: String,
        /// URI already holding the document identifier
        existing: String,
        /// The contested document identifier
        document_id: String,
    },

    /// I/O failure talking to the backend, with the underlying cause
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] std::io::Error),

    /// Aggregate error from `flush()`: the listed documents failed while
    /// any others were committed and remain committed.
    #[error("Flush failed for {} document(s)", .failures.len())]
    FlushPartialFailure {
        /// `(document id, cause)` for each document that could not be written
        failures: Vec<(String, Error)>,
    },

    /// Serialization error (serde_json)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation is intentionally not provided by this core
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Create a graph not found error
    pub fn graph_not_found(uri: impl Into<String>) -> Self {
        Error::GraphNotFound(uri.into())
    }

    /// Create a document not found error
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Error::DocumentNotFound(id.into())
    }

    /// Create a document corrupt error
    pub fn document_corrupt(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::DocumentCorrupt {
            id: id.into(),
            detail: detail.into(),
        }
    }

    /// Create a registry collision error
    pub fn registry_collision(
        uri: impl Into<String>,
        existing: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        Error::RegistryCollision {
            uri: uri.into(),
            existing: existing.into(),
            document_id: document_id.into(),
        }
    }

    /// Create a backend unavailable error from a plain message
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::BackendUnavailable(std::io::Error::other(msg.into()))
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: &'static str) -> Self {
        Error::Unsupported(msg)
    }

    /// True if this is a not-found error (graph or document)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::GraphNotFound(_) | Error::DocumentNotFound(_))
    }

    /// Document ids that failed to commit, if this is a partial flush failure
    pub fn failed_document_ids(&self) -> Option<Vec<&str>> {
        match self {
            Error::FlushPartialFailure { failures } => {
                Some(failures.iter().map(|(id, _)| id.as_str()).collect())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::graph_not_found("http://example.org/g");
        assert_eq!(err.to_string(), "Graph not found: http://example.org/g");

        let err = Error::document_corrupt("doc-1", "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "Document corrupt: doc-1: unexpected end of input"
        );
    }

    #[test]
    fn test_flush_partial_failure_ids() {
        let err = Error::FlushPartialFailure {
            failures: vec![
                ("doc-a".to_string(), Error::backend("disk full")),
                ("doc-b".to_string(), Error::document_not_found("doc-b")),
            ],
        };
        assert_eq!(err.failed_document_ids(), Some(vec!["doc-a", "doc-b"]));
        assert!(err.to_string().contains("2 document(s)"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::graph_not_found("u").is_not_found());
        assert!(Error::document_not_found("d").is_not_found());
        assert!(!Error::backend("io").is_not_found());
    }
}
