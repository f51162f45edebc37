//! Error types for drillgraph core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No document with this id.
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// The requested id.
        id: String,
    },

    /// No document contains this word.
    #[error("word not found: {word:?}")]
    WordNotFound {
        /// The requested word, as given.
        word: String,
    },

    /// A document with this id already exists.
    #[error("document already exists: {id}")]
    DocumentExists {
        /// The conflicting id.
        id: String,
    },

    /// An index addressed a segment that does not exist.
    #[error("{what} index {index} out of range (length {len})")]
    OutOfRange {
        /// What was addressed (`line`, `word`, `position`, ...).
        what: &'static str,
        /// The requested index.
        index: usize,
        /// Number of segments available.
        len: usize,
    },

    /// A level or depth outside 1–3.
    #[error("invalid level {level}: expected 1, 2 or 3")]
    InvalidLevel {
        /// The rejected value.
        level: i64,
    },

    /// A mutation address is missing a required parent index.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// What is missing.
        message: String,
    },

    /// A document id that cannot be stored.
    #[error("invalid document id {id:?}: {reason}")]
    InvalidDocumentId {
        /// The rejected id.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An operation that is well-addressed but not allowed.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description.
        message: String,
    },

    /// The graph store is not configured or not reachable.
    #[error("graph backend unavailable: {reason}")]
    BackendUnavailable {
        /// Why the backend cannot be used.
        reason: String,
    },

    /// Graph store error.
    #[error("graph error: {0}")]
    Graph(#[from] drillgraph_graph::GraphError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::DocumentNotFound { id: id.into() }
    }

    /// Creates a word-not-found error.
    pub fn word_not_found(word: impl Into<String>) -> Self {
        Self::WordNotFound { word: word.into() }
    }

    /// Creates an out-of-range error.
    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { what, index, len }
    }

    /// Creates an invalid address error.
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a backend unavailable error.
    pub fn backend_unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether the error comes from a caller supplying bad input, as opposed
    /// to a storage or backend failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DocumentNotFound { .. }
                | Self::WordNotFound { .. }
                | Self::DocumentExists { .. }
                | Self::OutOfRange { .. }
                | Self::InvalidLevel { .. }
                | Self::InvalidAddress { .. }
                | Self::InvalidDocumentId { .. }
                | Self::InvalidOperation { .. }
        )
    }
}
