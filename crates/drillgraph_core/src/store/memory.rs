//! In-memory document store.

use super::{Document, DocumentStore};
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A document store held in memory.
///
/// Useful for tests and for short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: RwLock::new(
                documents
                    .into_iter()
                    .map(|doc| (doc.id.clone(), doc))
                    .collect(),
            ),
        }
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list(&self) -> CoreResult<Vec<Document>> {
        Ok(self.documents.read().values().cloned().collect())
    }

    fn load(&self, id: &str) -> CoreResult<Document> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(id))
    }

    fn save(&self, document: &Document) -> CoreResult<()> {
        self.documents
            .write()
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> CoreResult<bool> {
        Ok(self.documents.write().remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud() {
        let store = MemoryDocumentStore::new();
        assert!(store.is_empty());

        store.save(&Document::new("b", "two")).unwrap();
        store.save(&Document::new("a", "one")).unwrap();
        assert_eq!(store.len(), 2);

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        store.save(&Document::new("a", "uno")).unwrap();
        assert_eq!(store.load("a").unwrap().text, "uno");

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(matches!(
            store.load("a"),
            Err(CoreError::DocumentNotFound { .. })
        ));
        assert!(!store.exists("a").unwrap());
        assert!(store.exists("b").unwrap());
    }
}
