//! Backend contract checks.
//!
//! The graph-backed and scan-based cross-link indexes must give identical
//! answers for the same documents. These helpers build both over one corpus
//! and compare them.

use crate::fixtures::memory_store;
use drillgraph_core::{
    derive_record, CoreResult, CrossLinkIndex, Delimiters, Diagnostics,
    DocumentStore, FallbackCrossLinkIndex, GraphClient, GraphCrossLinkIndex, IndexBackend,
    StaleTracker,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Both indexes over the same documents.
pub struct IndexPair {
    /// Answers by walking the graph.
    pub graph: GraphCrossLinkIndex,
    /// Answers by scanning documents.
    pub fallback: FallbackCrossLinkIndex,
    /// Graph client behind [`graph`](Self::graph).
    pub client: Arc<GraphClient>,
    /// Diagnostics shared with the graph index.
    pub diagnostics: Arc<Diagnostics>,
}

impl IndexPair {
    /// Indexes `documents` into a fresh in-memory graph and wraps the same
    /// documents in a scanning index.
    pub fn build(documents: &[(&str, &str)], delimiters: &Delimiters) -> CoreResult<Self> {
        let store: Arc<dyn DocumentStore> = Arc::new(memory_store(documents));
        let client = Arc::new(GraphClient::in_memory()?);
        for (id, text) in documents {
            client.upsert_document(&derive_record(id, text, delimiters))?;
        }
        let diagnostics = Arc::new(Diagnostics::new());
        let graph = GraphCrossLinkIndex::new(
            Arc::clone(&client),
            FallbackCrossLinkIndex::new(Arc::clone(&store), delimiters.clone()),
            Arc::clone(&diagnostics),
            Arc::new(StaleTracker::new()),
        );
        Ok(Self {
            graph,
            fallback: FallbackCrossLinkIndex::new(store, delimiters.clone()),
            client,
            diagnostics,
        })
    }
}

/// Every normalized word of `documents`.
pub fn vocabulary_of(documents: &[(&str, &str)], delimiters: &Delimiters) -> BTreeSet<String> {
    documents
        .iter()
        .flat_map(|(id, text)| derive_record(id, text, delimiters).lines)
        .flat_map(|line| line.words)
        .map(|word| word.normalized)
        .collect()
}

/// Asserts that both indexes agree on shared words and on the parents of
/// every word, both corpus-wide and per document.
///
/// # Panics
///
/// Panics on the first disagreement, or if the graph index fell back.
pub fn assert_backends_agree(documents: &[(&str, &str)], delimiters: &Delimiters) {
    let pair = IndexPair::build(documents, delimiters).expect("Failed to build indexes");

    let from_graph = pair.graph.find_common_words().expect("graph query failed");
    let from_scan = pair.fallback.find_common_words().expect("scan failed");
    assert_eq!(from_graph, from_scan, "find_common_words differs");
    assert_eq!(pair.graph.backend(), IndexBackend::Graph);

    for word in vocabulary_of(documents, delimiters) {
        let g = pair.graph.traverse_word_parents(&word, None).unwrap();
        let f = pair.fallback.traverse_word_parents(&word, None).unwrap();
        assert_eq!(g, f, "traverse differs for {word:?}");

        for (id, _) in documents {
            let g = pair.graph.traverse_word_parents(&word, Some(id)).unwrap();
            let f = pair.fallback.traverse_word_parents(&word, Some(id)).unwrap();
            assert_eq!(g, f, "traverse differs for {word:?} in {id}");
        }
    }
    assert_eq!(pair.graph.backend(), IndexBackend::Graph);
    assert_eq!(pair.diagnostics.snapshot().graph_failures, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SAMPLE_CORPUS;

    #[test]
    fn sample_corpus_agrees() {
        assert_backends_agree(&SAMPLE_CORPUS, &Delimiters::default());
    }

    #[test]
    fn vocabulary_is_normalized() {
        let words = vocabulary_of(&[("a", "The CAT"), ("b", "cat")], &Delimiters::default());
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["cat", "the"]);
    }
}
