//! Cross-document word index.
//!
//! Maps each normalized word to its occurrences across the corpus. Two
//! implementations answer the same queries:
//!
//! - [`GraphCrossLinkIndex`] walks the graph store, and falls back to the
//!   in-memory scan whenever the graph fails.
//! - [`FallbackCrossLinkIndex`] scans the document store.
//!
//! [`select_index`] picks one by probing the graph client once.

mod derive;
mod fallback;
mod graph_backed;

pub use derive::{derive_record, normalize_word};
pub use fallback::FallbackCrossLinkIndex;
pub use graph_backed::GraphCrossLinkIndex;

use crate::decompose::Delimiters;
use crate::diagnostics::Diagnostics;
use crate::error::CoreResult;
use crate::stale::StaleTracker;
use crate::store::DocumentStore;
use drillgraph_graph::{GraphClient, SharedWord, WordLink};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// One occurrence of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOccurrence {
    /// Normalized word.
    pub word: String,
    /// Owning document.
    pub document_id: String,
    /// Line position among the document's indexed lines.
    pub line_index: usize,
    /// Line text.
    pub line_text: String,
    /// Word position within the line.
    pub word_index: usize,
    /// The word as written.
    pub raw: String,
}

/// A word shared by at least two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossLinkEntry {
    /// Normalized word.
    pub word: String,
    /// Owning documents, ascending.
    pub documents: Vec<String>,
    /// Occurrences ordered by document, line and word position.
    pub occurrences: Vec<WordOccurrence>,
}

impl From<SharedWord> for CrossLinkEntry {
    fn from(shared: SharedWord) -> Self {
        let word = shared.word;
        Self {
            occurrences: shared
                .links
                .into_iter()
                .map(|link| WordOccurrence {
                    word: word.clone(),
                    document_id: link.document_id,
                    line_index: link.line_index,
                    line_text: link.line_text,
                    word_index: link.word_index,
                    raw: link.raw,
                })
                .collect(),
            documents: shared.documents,
            word,
        }
    }
}

/// One parent chain of a word: where it sits and what contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentTrace {
    /// Owning document.
    pub document_id: String,
    /// Line position.
    pub line_index: usize,
    /// Line text.
    pub line_text: String,
    /// Full document text.
    pub paragraph_text: String,
    /// Word position within the line.
    pub word_index: usize,
    /// The word as written.
    pub raw: String,
}

impl From<WordLink> for ParentTrace {
    fn from(link: WordLink) -> Self {
        Self {
            document_id: link.document_id,
            line_index: link.line_index,
            line_text: link.line_text,
            paragraph_text: link.paragraph_text,
            word_index: link.word_index,
            raw: link.raw,
        }
    }
}

/// Which implementation answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// The graph store.
    Graph,
    /// The in-memory scan.
    Fallback,
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Graph => "graph",
            Self::Fallback => "fallback",
        })
    }
}

/// Queries over the cross-document word index.
pub trait CrossLinkIndex: Send + Sync {
    /// Words occurring in two or more documents, by descending document
    /// count then ascending word.
    fn find_common_words(&self) -> CoreResult<Vec<CrossLinkEntry>>;

    /// Every occurrence of `word` (normalized first), optionally within one
    /// document, ordered by document, line and word position.
    fn traverse_word_parents(
        &self,
        word: &str,
        document_id: Option<&str>,
    ) -> CoreResult<Vec<ParentTrace>>;

    /// The implementation that answered the latest query.
    fn backend(&self) -> IndexBackend;
}

/// Picks the graph-backed index if `client` answers a ping, the fallback
/// otherwise.
pub fn select_index(
    client: Option<Arc<GraphClient>>,
    store: Arc<dyn DocumentStore>,
    delimiters: Delimiters,
    diagnostics: Arc<Diagnostics>,
    stale: Arc<StaleTracker>,
) -> Arc<dyn CrossLinkIndex> {
    let fallback = FallbackCrossLinkIndex::new(store, delimiters);
    let Some(client) = client else {
        info!("no graph store configured, using fallback cross-link index");
        return Arc::new(fallback);
    };
    match client.ping() {
        Ok(()) => {
            info!("using graph cross-link index");
            Arc::new(GraphCrossLinkIndex::new(
                client,
                fallback,
                diagnostics,
                stale,
            ))
        }
        Err(e) => {
            warn!(error = %e, "graph store unreachable, using fallback cross-link index");
            diagnostics.record_graph_failure("ping", &e);
            Arc::new(fallback)
        }
    }
}
