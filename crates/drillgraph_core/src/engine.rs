//! The engine facade.
//!
//! Owns the document store, the graph client, the synchronizer, the
//! cross-link index and the per-document locks. Every outward operation
//! goes through here.

use crate::config::Config;
use crate::crosslink::{select_index, CrossLinkEntry, CrossLinkIndex, IndexBackend, ParentTrace};
use crate::decompose::{split, Delimiters};
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::level::Level;
use crate::locks::DocumentLocks;
use crate::mutate::{apply_mutation, Mutation};
use crate::stale::StaleTracker;
use crate::store::{validate_document_id, Document, DocumentStore, Metadata};
use crate::sync::{IndexSynchronizer, RebuildReport, SyncStatus};
use crate::tree::{build_level_nodes, build_tree, FlowGraph};
use drillgraph_graph::{GraphClient, GraphStats};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest preview in a [`DocumentSummary`], in chars.
const PREVIEW_CHARS: usize = 80;

/// One row of [`Engine::list_summaries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Document id.
    pub id: String,
    /// Document metadata.
    pub metadata: Metadata,
    /// Non-blank lines.
    pub line_count: usize,
    /// Start of the first non-blank line.
    pub preview: String,
}

/// Parameters of [`Engine::drill_down`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillRequest {
    /// Document to explore.
    pub document_id: String,
    /// Level to fan out.
    pub level: Level,
    /// Text being split at levels 2 and 3. Ignored at level 1, where the
    /// document text is used.
    pub parent_text: String,
    /// Index of the parent element, echoed back.
    pub parent_index: Option<usize>,
    /// Delimiter override.
    pub delimiter: Option<String>,
}

impl DrillRequest {
    /// A request for the lines of a document.
    pub fn lines(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            level: Level::Lines,
            parent_text: String::new(),
            parent_index: None,
            delimiter: None,
        }
    }

    /// A request for the segments of `parent_text` at `level`.
    pub fn segments(
        document_id: impl Into<String>,
        level: Level,
        parent_text: impl Into<String>,
        parent_index: Option<usize>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            level,
            parent_text: parent_text.into(),
            parent_index,
            delimiter: None,
        }
    }

    /// Sets a delimiter override.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }
}

/// One level of a document, fanned out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelView {
    /// Document id.
    pub document_id: String,
    /// Level of the nodes.
    pub level: Level,
    /// Text that was split.
    pub parent_text: String,
    /// Index of the parent element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,
    /// The nodes and edges.
    #[serde(flatten)]
    pub graph: FlowGraph,
}

/// Result of [`Engine::navigate_up`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavigateUp {
    /// Already at the top; the caller goes back to the document list.
    AtTop,
    /// The level above.
    View(LevelView),
}

/// Result of [`Engine::mutate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    /// Document id.
    pub document_id: String,
    /// Text after the edit.
    pub text: String,
    /// Whether anything changed and was written.
    pub applied: bool,
    /// Index sync outcome, if the document was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<SyncStatus>,
}

/// Result of [`Engine::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// Whether the graph store answered a ping.
    pub graph_available: bool,
    /// Implementation that answered the latest cross-link query.
    pub backend: IndexBackend,
    /// Documents in the store.
    pub documents: usize,
    /// Graph counters, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphStats>,
    /// Documents the graph missed since their last successful sync.
    pub stale_documents: Vec<String>,
    /// Failure counters.
    pub diagnostics: DiagnosticsSnapshot,
}

/// The drillgraph engine.
///
/// # Example
///
/// ```rust
/// use drillgraph_core::{Address, Config, Edit, Engine, MemoryDocumentStore, Mutation};
/// use std::sync::Arc;
///
/// let engine = Engine::open(Config::default(), Arc::new(MemoryDocumentStore::new())).unwrap();
/// engine.create_document("a", "the cat", Default::default()).unwrap();
/// let result = engine
///     .mutate("a", &Mutation::new(Address::words(0), Edit::Insert { position: 1, value: "new".into() }))
///     .unwrap();
/// assert_eq!(result.text, "the new cat");
/// ```
pub struct Engine {
    config: Config,
    store: Arc<dyn DocumentStore>,
    graph: Option<Arc<GraphClient>>,
    sync: IndexSynchronizer,
    index: Arc<dyn CrossLinkIndex>,
    locks: DocumentLocks,
    diagnostics: Arc<Diagnostics>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("backend", &self.index.backend())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Opens the engine, connecting to the graph store named in `config`.
    ///
    /// A graph store that cannot be reached is logged and the engine runs on
    /// the fallback index.
    pub fn open(config: Config, store: Arc<dyn DocumentStore>) -> CoreResult<Self> {
        let diagnostics = Arc::new(Diagnostics::new());
        let graph = match &config.graph {
            None => None,
            Some(graph_config) => match GraphClient::connect(graph_config) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "graph store unavailable, continuing without it");
                    diagnostics.record_graph_failure("connect", &e);
                    None
                }
            },
        };
        Ok(Self::assemble(config, store, graph, diagnostics))
    }

    /// Opens the engine over an already connected graph client.
    pub fn with_graph(
        config: Config,
        store: Arc<dyn DocumentStore>,
        graph: Option<Arc<GraphClient>>,
    ) -> Self {
        Self::assemble(config, store, graph, Arc::new(Diagnostics::new()))
    }

    fn assemble(
        config: Config,
        store: Arc<dyn DocumentStore>,
        graph: Option<Arc<GraphClient>>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        let stale = Arc::new(StaleTracker::new());
        let sync = IndexSynchronizer::new(
            graph.clone(),
            config.delimiters.clone(),
            Arc::clone(&diagnostics),
            Arc::clone(&stale),
        );
        let index = select_index(
            graph.clone(),
            Arc::clone(&store),
            config.delimiters.clone(),
            Arc::clone(&diagnostics),
            stale,
        );
        let engine = Self {
            config,
            store,
            graph,
            sync,
            index,
            locks: DocumentLocks::new(),
            diagnostics,
        };
        if engine.config.index_on_startup {
            engine.index_if_empty();
        }
        engine
    }

    /// Fills an empty graph store from the document store.
    fn index_if_empty(&self) {
        let Some(client) = &self.graph else {
            return;
        };
        match client.is_empty() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!(error = %e, "cannot inspect graph store, skipping startup indexing");
                self.diagnostics.record_graph_failure("startup", &e);
                return;
            }
        }
        let documents = match self.store.list() {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "cannot list documents, skipping startup indexing");
                return;
            }
        };
        let mut indexed = 0;
        for doc in &documents {
            if self.sync.index_document(&doc.id, &doc.text) == SyncStatus::Indexed {
                indexed += 1;
            } else {
                warn!(document = %doc.id, "startup indexing failed");
            }
        }
        info!(indexed, total = documents.len(), "startup indexing finished");
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The graph client, if connected.
    #[must_use]
    pub fn graph(&self) -> Option<&Arc<GraphClient>> {
        self.graph.as_ref()
    }

    /// Splits `text` at `level`, with the configured delimiter unless one is
    /// given.
    #[must_use]
    pub fn decompose(&self, text: &str, level: Level, delimiter: Option<&str>) -> Vec<String> {
        let delimiter = delimiter.unwrap_or_else(|| self.config.delimiters.get(level));
        split(text, delimiter, level)
    }

    /// Builds the full tree of one document.
    ///
    /// `depth` defaults to the configured depth.
    pub fn build_tree(&self, document_id: &str, depth: Option<u8>) -> CoreResult<FlowGraph> {
        self.build_tree_with(document_id, depth, &self.config.delimiters)
    }

    /// Like [`build_tree`](Self::build_tree) with explicit delimiters.
    pub fn build_tree_with(
        &self,
        document_id: &str,
        depth: Option<u8>,
        delimiters: &Delimiters,
    ) -> CoreResult<FlowGraph> {
        let doc = self.store.load(document_id)?;
        build_tree(
            &doc.id,
            &doc.text,
            delimiters,
            depth.unwrap_or(self.config.default_depth),
        )
    }

    /// Fans out one level of a document.
    pub fn drill_down(&self, request: &DrillRequest) -> CoreResult<LevelView> {
        let doc = self.store.load(&request.document_id)?;
        let text = match request.level {
            Level::Lines => doc.text,
            Level::Words | Level::Chars => request.parent_text.clone(),
        };
        let parts = self.decompose(&text, request.level, request.delimiter.as_deref());
        let graph = build_level_nodes(
            &parts,
            request.level,
            &request.document_id,
            &text,
            request.parent_index,
        );
        Ok(LevelView {
            document_id: request.document_id.clone(),
            level: request.level,
            parent_text: text,
            parent_index: request.parent_index,
            graph,
        })
    }

    /// The view one level above `current`.
    ///
    /// From level 3, `line_index` picks the line whose words are shown; a
    /// missing or out-of-range index falls back to the first line.
    pub fn navigate_up(
        &self,
        document_id: &str,
        current: Level,
        line_index: Option<usize>,
    ) -> CoreResult<NavigateUp> {
        let doc = self.store.load(document_id)?;
        let Some(parent) = current.parent() else {
            return Ok(NavigateUp::AtTop);
        };
        let lines = self.decompose(&doc.text, Level::Lines, None);

        let view = match parent {
            Level::Lines => LevelView {
                document_id: doc.id.clone(),
                level: Level::Lines,
                graph: build_level_nodes(&lines, Level::Lines, &doc.id, &doc.text, None),
                parent_text: doc.text,
                parent_index: None,
            },
            Level::Words | Level::Chars => {
                let (index, line) = match line_index.and_then(|i| lines.get(i).map(|l| (i, l.as_str()))) {
                    Some(found) => found,
                    None => (0, lines.first().map_or("", String::as_str)),
                };
                let line = line.to_string();
                let words = self.decompose(&line, Level::Words, None);
                LevelView {
                    document_id: doc.id.clone(),
                    level: Level::Words,
                    graph: build_level_nodes(&words, Level::Words, &doc.id, &line, Some(index)),
                    parent_text: line,
                    parent_index: Some(index),
                }
            }
        };
        Ok(NavigateUp::View(view))
    }

    /// Applies a structural edit, saves the document and re-indexes it.
    ///
    /// The load-edit-save-index sequence runs under the document's lock.
    /// A delete out of range changes nothing and writes nothing.
    pub fn mutate(&self, document_id: &str, mutation: &Mutation) -> CoreResult<MutationResult> {
        self.locks.with_lock(document_id, || -> CoreResult<MutationResult> {
            let mut doc = self.store.load(document_id)?;
            let outcome = apply_mutation(&doc.text, &self.config.delimiters, mutation)?;
            if !outcome.applied {
                return Ok(MutationResult {
                    document_id: doc.id,
                    text: outcome.text,
                    applied: false,
                    index: None,
                });
            }

            doc.text = outcome.text;
            self.store.save(&doc)?;
            let status = self.sync.index_document(&doc.id, &doc.text);
            info!(
                document = document_id,
                level = %mutation.address.level,
                op = mutation.edit.name(),
                index = ?status,
                "document mutated"
            );
            Ok(MutationResult {
                document_id: doc.id,
                text: doc.text,
                applied: true,
                index: Some(status),
            })
        })
    }

    /// Creates a document and indexes it.
    ///
    /// # Errors
    ///
    /// [`CoreError::DocumentExists`] if the id is taken,
    /// [`CoreError::InvalidDocumentId`] if it cannot be stored.
    pub fn create_document(
        &self,
        id: &str,
        text: &str,
        metadata: Metadata,
    ) -> CoreResult<Document> {
        validate_document_id(id)?;
        self.locks.with_lock(id, || -> CoreResult<Document> {
            if self.store.exists(id)? {
                return Err(CoreError::DocumentExists { id: id.to_string() });
            }
            let doc = Document::new(id, text).with_metadata(metadata);
            self.store.save(&doc)?;
            let status = self.sync.index_document(id, text);
            info!(document = id, index = ?status, "document created");
            Ok(doc)
        })
    }

    /// Deletes a document and purges it from the graph.
    pub fn delete_document(&self, id: &str) -> CoreResult<()> {
        self.locks.with_lock(id, || -> CoreResult<()> {
            if !self.store.delete(id)? {
                return Err(CoreError::not_found(id));
            }
            let status = self.sync.delete_document_graph(id);
            info!(document = id, index = ?status, "document deleted");
            Ok(())
        })
    }

    /// One document.
    pub fn document(&self, id: &str) -> CoreResult<Document> {
        self.store.load(id)
    }

    /// Replaces a document's metadata. The text and the index are untouched.
    pub fn update_metadata(&self, id: &str, metadata: Metadata) -> CoreResult<Document> {
        self.locks.with_lock(id, || -> CoreResult<Document> {
            let doc = self.store.load(id)?.with_metadata(metadata);
            self.store.save(&doc)?;
            debug!(document = id, "metadata updated");
            Ok(doc)
        })
    }

    /// Id, metadata, line count and preview of every document.
    pub fn list_summaries(&self) -> CoreResult<Vec<DocumentSummary>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|doc| {
                let lines: Vec<String> = self
                    .decompose(&doc.text, Level::Lines, None)
                    .into_iter()
                    .filter(|l| !l.trim().is_empty())
                    .collect();
                DocumentSummary {
                    preview: lines
                        .first()
                        .map(|l| l.chars().take(PREVIEW_CHARS).collect())
                        .unwrap_or_default(),
                    line_count: lines.len(),
                    metadata: doc.metadata,
                    id: doc.id,
                }
            })
            .collect())
    }

    /// Words shared by two or more documents.
    pub fn cross_links(&self) -> CoreResult<Vec<CrossLinkEntry>> {
        self.index.find_common_words()
    }

    /// Every occurrence of `word`, optionally within one document.
    ///
    /// # Errors
    ///
    /// [`CoreError::DocumentNotFound`] if `document_id` names no document,
    /// [`CoreError::WordNotFound`] if the word has no occurrences.
    pub fn traverse(&self, word: &str, document_id: Option<&str>) -> CoreResult<Vec<ParentTrace>> {
        if let Some(id) = document_id {
            if !self.store.exists(id)? {
                return Err(CoreError::not_found(id));
            }
        }
        let traces = self.index.traverse_word_parents(word, document_id)?;
        if traces.is_empty() {
            return Err(CoreError::word_not_found(word));
        }
        Ok(traces)
    }

    /// Wipes the graph and indexes every document.
    ///
    /// Runs alongside writes; each document is indexed under its lock.
    pub fn rebuild_index(&self) -> CoreResult<RebuildReport> {
        self.sync.rebuild_full_graph(self.store.as_ref(), &self.locks)
    }

    /// Rewrites the graph journal.
    ///
    /// # Errors
    ///
    /// [`CoreError::BackendUnavailable`] without a graph store.
    pub fn compact_graph(&self) -> CoreResult<GraphStats> {
        let client = self
            .graph
            .as_ref()
            .ok_or_else(|| CoreError::backend_unavailable("graph store not configured"))?;
        Ok(client.compact()?)
    }

    /// Availability, backend and counters.
    pub fn status(&self) -> CoreResult<EngineStatus> {
        let (graph_available, graph) = match &self.graph {
            Some(client) => match client.stats() {
                Ok(stats) => (true, Some(stats)),
                Err(e) => {
                    debug!(error = %e, "graph stats unavailable");
                    (false, None)
                }
            },
            None => (false, None),
        };
        Ok(EngineStatus {
            graph_available,
            backend: self.index.backend(),
            documents: self.store.list()?.len(),
            graph,
            stale_documents: self.sync.stale().documents(),
            diagnostics: self.diagnostics.snapshot(),
        })
    }

    /// Closes the graph client. The engine keeps working on the fallback.
    pub fn close(&self) {
        if let Some(client) = &self.graph {
            client.close();
        }
        info!("engine closed");
    }
}
