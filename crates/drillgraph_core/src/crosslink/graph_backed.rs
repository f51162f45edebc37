//! Cross-link index answered by the graph store.

use super::derive::normalize_word;
use super::fallback::FallbackCrossLinkIndex;
use super::{CrossLinkEntry, CrossLinkIndex, IndexBackend, ParentTrace};
use crate::diagnostics::Diagnostics;
use crate::error::CoreResult;
use crate::stale::StaleTracker;
use drillgraph_graph::{GraphClient, GraphError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Walks `Word ← Line ← Paragraph ← Document` in the graph store.
///
/// Fails open: a graph error is recorded in [`Diagnostics`] and the query is
/// answered by the embedded [`FallbackCrossLinkIndex`]. The fallback also
/// answers while the [`StaleTracker`] reports documents the graph missed.
pub struct GraphCrossLinkIndex {
    client: Arc<GraphClient>,
    fallback: FallbackCrossLinkIndex,
    diagnostics: Arc<Diagnostics>,
    stale: Arc<StaleTracker>,
    fell_back: AtomicBool,
}

impl std::fmt::Debug for GraphCrossLinkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphCrossLinkIndex")
            .field("client", &self.client)
            .field("fell_back", &self.fell_back.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl GraphCrossLinkIndex {
    /// Creates an index over `client`.
    ///
    /// `stale` must be the tracker the [`IndexSynchronizer`] writing to
    /// `client` reports into.
    ///
    /// [`IndexSynchronizer`]: crate::IndexSynchronizer
    pub fn new(
        client: Arc<GraphClient>,
        fallback: FallbackCrossLinkIndex,
        diagnostics: Arc<Diagnostics>,
        stale: Arc<StaleTracker>,
    ) -> Self {
        Self {
            client,
            fallback,
            diagnostics,
            stale,
            fell_back: AtomicBool::new(false),
        }
    }

    fn answer<T>(
        &self,
        op: &'static str,
        graph: impl FnOnce(&GraphClient) -> Result<T, GraphError>,
        fallback: impl FnOnce(&FallbackCrossLinkIndex) -> CoreResult<T>,
    ) -> CoreResult<T> {
        if self.stale.is_stale() {
            debug!(op, "graph is behind the documents, answering from fallback");
            self.diagnostics.record_fallback_answer();
            self.fell_back.store(true, Ordering::Relaxed);
            return fallback(&self.fallback);
        }
        match graph(&self.client) {
            Ok(value) => {
                self.fell_back.store(false, Ordering::Relaxed);
                Ok(value)
            }
            Err(e) => {
                warn!(op, error = %e, "graph query failed, answering from fallback");
                self.diagnostics.record_graph_failure(op, &e);
                self.diagnostics.record_fallback_answer();
                self.fell_back.store(true, Ordering::Relaxed);
                fallback(&self.fallback)
            }
        }
    }
}

impl CrossLinkIndex for GraphCrossLinkIndex {
    fn find_common_words(&self) -> CoreResult<Vec<CrossLinkEntry>> {
        self.answer(
            "find_common_words",
            |client| {
                client
                    .shared_words()
                    .map(|words| words.into_iter().map(CrossLinkEntry::from).collect())
            },
            |f| f.find_common_words(),
        )
    }

    fn traverse_word_parents(
        &self,
        word: &str,
        document_id: Option<&str>,
    ) -> CoreResult<Vec<ParentTrace>> {
        let needle = normalize_word(word);
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.answer(
            "traverse_word_parents",
            |client| {
                client
                    .word_parents(&needle, document_id)
                    .map(|links| links.into_iter().map(ParentTrace::from).collect())
            },
            |f| f.traverse_word_parents(&needle, document_id),
        )
    }

    fn backend(&self) -> IndexBackend {
        if self.fell_back.load(Ordering::Relaxed) {
            IndexBackend::Fallback
        } else {
            IndexBackend::Graph
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosslink::derive_record;
    use crate::decompose::Delimiters;
    use crate::store::{Document, DocumentStore, MemoryDocumentStore};

    struct Setup {
        index: GraphCrossLinkIndex,
        client: Arc<GraphClient>,
        diagnostics: Arc<Diagnostics>,
        stale: Arc<StaleTracker>,
        store: Arc<MemoryDocumentStore>,
    }

    fn setup(docs: &[(&str, &str)]) -> Setup {
        let store = Arc::new(MemoryDocumentStore::with_documents(
            docs.iter().map(|(id, text)| Document::new(*id, *text)),
        ));
        let client = Arc::new(GraphClient::in_memory().unwrap());
        for doc in store.list().unwrap() {
            client
                .upsert_document(&derive_record(&doc.id, &doc.text, &Delimiters::default()))
                .unwrap();
        }
        let diagnostics = Arc::new(Diagnostics::new());
        let stale = Arc::new(StaleTracker::new());
        let index = GraphCrossLinkIndex::new(
            Arc::clone(&client),
            FallbackCrossLinkIndex::new(store.clone(), Delimiters::default()),
            Arc::clone(&diagnostics),
            Arc::clone(&stale),
        );
        Setup {
            index,
            client,
            diagnostics,
            stale,
            store,
        }
    }

    #[test]
    fn answers_from_graph() {
        let Setup {
            index, diagnostics, ..
        } = setup(&[("A", "the cat sat\nthe dog ran"), ("B", "the cat ran fast")]);
        let words: Vec<String> = index
            .find_common_words()
            .unwrap()
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(words, vec!["cat", "ran", "the"]);
        assert_eq!(index.backend(), IndexBackend::Graph);
        assert_eq!(diagnostics.snapshot().fallback_answers, 0);

        let traces = index.traverse_word_parents("CAT", Some("B")).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].paragraph_text, "the cat ran fast");
    }

    #[test]
    fn falls_back_when_graph_fails() {
        let Setup {
            index,
            client,
            diagnostics,
            ..
        } = setup(&[("A", "shared"), ("B", "Shared")]);
        client.close();

        let entries = index.find_common_words().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(index.backend(), IndexBackend::Fallback);

        let traces = index.traverse_word_parents("shared", None).unwrap();
        assert_eq!(traces.len(), 2);

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.graph_failures, 2);
        assert_eq!(snapshot.fallback_answers, 2);
        assert!(snapshot.last_error.unwrap().contains("closed"));
    }

    #[test]
    fn stale_documents_are_answered_from_documents() {
        let Setup {
            index,
            client,
            diagnostics,
            stale,
            store,
        } = setup(&[("A", "red dog"), ("B", "dog")]);
        // The graph still holds "dog" for A, but A no longer has it.
        store.save(&Document::new("A", "red")).unwrap();
        stale.mark("A");

        assert!(index.find_common_words().unwrap().is_empty());
        assert_eq!(index.traverse_word_parents("dog", None).unwrap().len(), 1);
        assert_eq!(index.backend(), IndexBackend::Fallback);
        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.fallback_answers, 2);
        assert_eq!(snapshot.graph_failures, 0);

        client
            .upsert_document(&derive_record("A", "red", &Delimiters::default()))
            .unwrap();
        stale.clear("A");
        assert!(index.find_common_words().unwrap().is_empty());
        assert_eq!(index.backend(), IndexBackend::Graph);
    }
}
