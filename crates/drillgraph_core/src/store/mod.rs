//! Authoritative document storage.
//!
//! The document store is the single source of truth. The graph store is
//! derived from it and can always be rebuilt.

mod json_dir;
mod memory;

pub use json_dir::JsonDirStore;
pub use memory::MemoryDocumentStore;

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque document metadata.
pub type Metadata = Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique id.
    #[serde(default)]
    pub id: String,
    /// Newline-delimited text.
    #[serde(alias = "paragraph", default)]
    pub text: String,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Creates a document with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Storage of documents keyed by id.
///
/// Implementations must be safe to share between threads. Writes replace a
/// whole document atomically.
pub trait DocumentStore: Send + Sync {
    /// Every document, ordered by id.
    fn list(&self) -> CoreResult<Vec<Document>>;

    /// One document.
    ///
    /// # Errors
    ///
    /// [`CoreError::DocumentNotFound`] if absent.
    fn load(&self, id: &str) -> CoreResult<Document>;

    /// Creates or replaces a document.
    fn save(&self, document: &Document) -> CoreResult<()>;

    /// Removes a document. Returns whether it existed.
    fn delete(&self, id: &str) -> CoreResult<bool>;

    /// Whether a document exists.
    fn exists(&self, id: &str) -> CoreResult<bool> {
        match self.load(id) {
            Ok(_) => Ok(true),
            Err(CoreError::DocumentNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Checks that `id` can be used as a document id.
///
/// Ids are non-empty, made of ASCII letters, digits, `_`, `-` and `.`, and
/// do not start with `.`.
pub fn validate_document_id(id: &str) -> CoreResult<()> {
    let reject = |reason: &'static str| -> CoreResult<()> {
        Err(CoreError::InvalidDocumentId {
            id: id.to_string(),
            reason,
        })
    };
    if id.is_empty() {
        return reject("empty");
    }
    if id.starts_with('.') {
        return reject("starts with '.'");
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
    {
        return reject("only ASCII letters, digits, '_', '-' and '.' are allowed");
    }
    Ok(())
}
