//! Connection handle over a journaled word graph.

use crate::config::{GraphConfig, GraphLocation};
use crate::dir::GraphDir;
use crate::error::{GraphError, GraphResult};
use crate::graph::WordGraph;
use crate::journal::{Journal, JournalOp};
use crate::model::{DocumentRecord, GraphStats, SharedWord, WordLink};
use drillgraph_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

struct Inner {
    graph: WordGraph,
    journal: Journal,
}

/// A connected graph store.
///
/// Every write goes to the journal first and is applied to the in-memory
/// graph only once the append succeeded, so a failed write leaves both
/// unchanged. Each operation waits at most
/// [`operation_timeout`](GraphConfig::operation_timeout) for the state lock.
///
/// # Example
///
/// ```rust
/// use drillgraph_graph::{DocumentRecord, GraphClient};
///
/// let client = GraphClient::in_memory().unwrap();
/// client.upsert_document(&DocumentRecord {
///     document_id: "a".into(),
///     paragraph: String::new(),
///     lines: vec![],
/// }).unwrap();
/// assert_eq!(client.stats().unwrap().documents, 1);
/// ```
pub struct GraphClient {
    config: GraphConfig,
    state: RwLock<Inner>,
    dir: Mutex<Option<GraphDir>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("location", &self.config.location)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Connects according to `config`, replaying the journal.
    ///
    /// # Errors
    ///
    /// Fails if the directory is missing or locked past the connect timeout,
    /// or if the journal is corrupted and `reset_on_corruption` is off.
    pub fn connect(config: &GraphConfig) -> GraphResult<Self> {
        match &config.location {
            GraphLocation::InMemory => {
                Self::with_backend(Box::new(InMemoryBackend::new()), config.clone())
            }
            GraphLocation::Directory(path) => {
                let dir = GraphDir::open(path, config.create_if_missing, config.connect_timeout)?;
                dir.remove_stale_temp()?;
                let backend = FileBackend::open(&dir.journal_path())?;
                let client = Self::with_backend(Box::new(backend), config.clone())?;
                *client.dir.lock() = Some(dir);
                info!(path = %path.display(), "graph store connected");
                Ok(client)
            }
        }
    }

    /// Connects over an arbitrary backend. No directory lock is taken.
    pub fn with_backend(backend: Box<dyn StorageBackend>, config: GraphConfig) -> GraphResult<Self> {
        let mut journal = Journal::new(backend, config.sync_on_write, config.max_frame_bytes);
        let ops = journal.replay(config.reset_on_corruption)?;

        let mut graph = WordGraph::new();
        let frames = ops.len();
        for op in &ops {
            apply(&mut graph, op);
        }
        debug!(frames, documents = graph.stats().documents, "graph rebuilt from journal");

        Ok(Self {
            config,
            state: RwLock::new(Inner { graph, journal }),
            dir: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// Connects to a fresh in-memory store with default settings.
    pub fn in_memory() -> GraphResult<Self> {
        Self::connect(&GraphConfig::in_memory())
    }

    /// The configuration used to connect.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Checks that the store answers within the operation timeout.
    pub fn ping(&self) -> GraphResult<()> {
        self.read("ping").map(|_| ())
    }

    /// Replaces one document's subgraph.
    pub fn upsert_document(&self, record: &DocumentRecord) -> GraphResult<()> {
        self.write_op("upsert_document", JournalOp::Upsert(record.clone()))
    }

    /// Removes one document's subgraph. Removing an absent document is not
    /// an error.
    pub fn purge_document(&self, document_id: &str) -> GraphResult<()> {
        self.write_op(
            "purge_document",
            JournalOp::Purge {
                document_id: document_id.to_string(),
            },
        )
    }

    /// Removes every document and empties the journal.
    pub fn wipe(&self) -> GraphResult<()> {
        let mut inner = self.write("wipe")?;
        inner.journal.reset()?;
        inner.graph.clear();
        info!("graph store wiped");
        Ok(())
    }

    /// Words shared by two or more documents.
    pub fn shared_words(&self) -> GraphResult<Vec<SharedWord>> {
        Ok(self.read("shared_words")?.graph.shared_words())
    }

    /// Occurrences of one normalized word, optionally within one document.
    pub fn word_parents(
        &self,
        normalized: &str,
        document_id: Option<&str>,
    ) -> GraphResult<Vec<WordLink>> {
        Ok(self
            .read("word_parents")?
            .graph
            .word_links(normalized, document_id))
    }

    /// Indexed document ids, ascending.
    pub fn document_ids(&self) -> GraphResult<Vec<String>> {
        Ok(self
            .read("document_ids")?
            .graph
            .document_ids()
            .map(str::to_string)
            .collect())
    }

    /// Whether no document is indexed.
    pub fn is_empty(&self) -> GraphResult<bool> {
        Ok(self.read("is_empty")?.graph.is_empty())
    }

    /// Graph and journal counters.
    pub fn stats(&self) -> GraphResult<GraphStats> {
        let inner = self.read("stats")?;
        let mut stats = inner.graph.stats();
        stats.journal_bytes = inner.journal.size()?;
        Ok(stats)
    }

    /// Rewrites the journal to hold one frame per indexed document.
    ///
    /// For a directory store the new journal is written beside the live one
    /// and renamed over it.
    pub fn compact(&self) -> GraphResult<GraphStats> {
        let mut inner = self.write("compact")?;
        let before = inner.journal.size()?;

        let records: Vec<DocumentRecord> = inner
            .graph
            .document_ids()
            .filter_map(|id| inner.graph.document_record(id))
            .collect();

        let dir = self.dir.lock();
        match dir.as_ref() {
            Some(dir) => {
                let temp = dir.journal_temp_path();
                {
                    let mut fresh = Journal::new(
                        Box::new(FileBackend::open(&temp)?),
                        false,
                        self.config.max_frame_bytes,
                    );
                    fresh.reset()?;
                    for record in &records {
                        fresh.append(&JournalOp::Upsert(record.clone()))?;
                    }
                    fresh.sync()?;
                }
                dir.install_compacted_journal()?;
                inner.journal = Journal::new(
                    Box::new(FileBackend::open(&dir.journal_path())?),
                    self.config.sync_on_write,
                    self.config.max_frame_bytes,
                );
            }
            None => {
                inner.journal.reset()?;
                for record in &records {
                    inner.journal.append(&JournalOp::Upsert(record.clone()))?;
                }
                inner.journal.sync()?;
            }
        }
        drop(dir);

        let mut stats = inner.graph.stats();
        stats.journal_bytes = inner.journal.size()?;
        info!(
            before,
            after = stats.journal_bytes,
            documents = records.len(),
            "graph journal compacted"
        );
        Ok(stats)
    }

    /// Closes the client and releases the directory lock.
    ///
    /// Every later operation fails with [`GraphError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(mut inner) = self.state.try_write_for(self.config.operation_timeout) {
            if let Err(e) = inner.journal.sync() {
                warn!(error = %e, "graph journal sync on close failed");
            }
        }
        self.dir.lock().take();
        debug!("graph client closed");
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn write_op(&self, op_name: &'static str, op: JournalOp) -> GraphResult<()> {
        let mut inner = self.write(op_name)?;
        inner.journal.append(&op)?;
        apply(&mut inner.graph, &op);
        Ok(())
    }

    fn read(&self, op: &'static str) -> GraphResult<RwLockReadGuard<'_, Inner>> {
        self.ensure_open()?;
        self.state
            .try_read_for(self.config.operation_timeout)
            .ok_or(GraphError::Timeout {
                op,
                timeout: self.config.operation_timeout,
            })
    }

    fn write(&self, op: &'static str) -> GraphResult<RwLockWriteGuard<'_, Inner>> {
        self.ensure_open()?;
        self.state
            .try_write_for(self.config.operation_timeout)
            .ok_or(GraphError::Timeout {
                op,
                timeout: self.config.operation_timeout,
            })
    }

    fn ensure_open(&self) -> GraphResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(GraphError::Closed)
        } else {
            Ok(())
        }
    }
}

fn apply(graph: &mut WordGraph, op: &JournalOp) {
    match op {
        JournalOp::Upsert(record) => graph.upsert(record),
        JournalOp::Purge { document_id } => {
            graph.purge(document_id);
        }
    }
}
