//! Error types for the graph store.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by the graph store.
///
/// Callers in `drillgraph_core` treat every variant as "backend unavailable"
/// and answer from the document store instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] drillgraph_storage::StorageError),

    /// I/O error outside the journal (directory, lock file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another process owns the store directory.
    #[error("graph store locked: {path} is held by another owner")]
    Locked {
        /// The locked store directory.
        path: PathBuf,
    },

    /// The store directory does not exist and creation was not requested.
    #[error("graph store missing: {path}")]
    Missing {
        /// The expected store directory.
        path: PathBuf,
    },

    /// An operation could not get the state lock in time.
    #[error("graph operation `{op}` timed out after {timeout:?}")]
    Timeout {
        /// Operation name.
        op: &'static str,
        /// The configured operation timeout.
        timeout: Duration,
    },

    /// The client was closed.
    #[error("graph client is closed")]
    Closed,

    /// The journal holds a frame that fails validation.
    #[error("journal corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Offset of the bad frame.
        offset: u64,
        /// What was wrong with it.
        message: String,
    },

    /// A document encodes to a frame above the configured limit.
    #[error("journal frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Encoded frame size.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// CBOR encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),
}

impl GraphError {
    /// Creates a corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl std::fmt::Display) -> Self {
        Self::Codec(message.to_string())
    }
}
