//! Keeping the graph store in step with the document store.
//!
//! The document store is authoritative. Every write to it is followed by a
//! purge-and-rebuild of that document's subgraph; a full rebuild wipes the
//! graph and indexes every document again. Graph failures are logged and
//! counted, never returned, since the graph can always be rebuilt. Every
//! document the graph missed is marked in the [`StaleTracker`] until it is
//! indexed again.

use crate::crosslink::derive_record;
use crate::decompose::Delimiters;
use crate::diagnostics::Diagnostics;
use crate::error::{CoreError, CoreResult};
use crate::locks::DocumentLocks;
use crate::stale::StaleTracker;
use crate::store::DocumentStore;
use drillgraph_graph::{GraphClient, GraphResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a single-document sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// The graph reflects the document.
    Indexed,
    /// The graph was unavailable or failed; it may be stale until the next
    /// rebuild.
    Skipped,
}

/// Overall outcome of [`IndexSynchronizer::rebuild_full_graph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RebuildStatus {
    /// The graph was wiped and refilled.
    Rebuilt,
    /// Nothing was done.
    Skipped {
        /// Why.
        reason: String,
    },
}

/// A document that could not be indexed during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildError {
    /// The document.
    pub document_id: String,
    /// The graph error, rendered.
    pub error: String,
}

/// Report of a full rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// Overall outcome.
    #[serde(flatten)]
    pub status: RebuildStatus,
    /// Documents indexed.
    pub indexed: usize,
    /// Documents that failed.
    pub failed: usize,
    /// One entry per failed document.
    pub errors: Vec<RebuildError>,
}

impl RebuildReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: RebuildStatus::Skipped {
                reason: reason.into(),
            },
            indexed: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }
}

/// Writes document changes through to the graph store.
pub struct IndexSynchronizer {
    client: Option<Arc<GraphClient>>,
    delimiters: Delimiters,
    diagnostics: Arc<Diagnostics>,
    stale: Arc<StaleTracker>,
}

impl std::fmt::Debug for IndexSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSynchronizer")
            .field("client", &self.client)
            .field("delimiters", &self.delimiters)
            .finish_non_exhaustive()
    }
}

impl IndexSynchronizer {
    /// Creates a synchronizer. With no client every sync is skipped.
    pub fn new(
        client: Option<Arc<GraphClient>>,
        delimiters: Delimiters,
        diagnostics: Arc<Diagnostics>,
        stale: Arc<StaleTracker>,
    ) -> Self {
        Self {
            client,
            delimiters,
            diagnostics,
            stale,
        }
    }

    /// Documents the graph currently misses.
    #[must_use]
    pub fn stale(&self) -> &Arc<StaleTracker> {
        &self.stale
    }

    /// The graph client, if any.
    #[must_use]
    pub fn client(&self) -> Option<&Arc<GraphClient>> {
        self.client.as_ref()
    }

    /// Replaces the graph representation of one document.
    ///
    /// Idempotent: indexing the same text twice leaves the same graph.
    /// The caller holds the document's lock.
    pub fn index_document(&self, id: &str, text: &str) -> SyncStatus {
        let Some(client) = &self.client else {
            self.diagnostics.record_skipped_sync();
            return SyncStatus::Skipped;
        };
        match self.upsert(client, id, text) {
            Ok(()) => {
                self.stale.clear(id);
                debug!(document = id, "document indexed");
                SyncStatus::Indexed
            }
            Err(e) => {
                self.stale.mark(id);
                warn!(document = id, error = %e, "indexing skipped");
                self.diagnostics.record_graph_failure("index_document", &e);
                self.diagnostics.record_skipped_sync();
                SyncStatus::Skipped
            }
        }
    }

    /// Removes one document from the graph. The caller holds the document's
    /// lock.
    pub fn delete_document_graph(&self, id: &str) -> SyncStatus {
        let Some(client) = &self.client else {
            self.diagnostics.record_skipped_sync();
            return SyncStatus::Skipped;
        };
        match client.purge_document(id) {
            Ok(()) => {
                self.stale.clear(id);
                debug!(document = id, "document purged from graph");
                SyncStatus::Indexed
            }
            Err(e) => {
                self.stale.mark(id);
                warn!(document = id, error = %e, "graph purge skipped");
                self.diagnostics.record_graph_failure("delete_document_graph", &e);
                self.diagnostics.record_skipped_sync();
                SyncStatus::Skipped
            }
        }
    }

    /// Wipes the graph and indexes every document in store order.
    ///
    /// The store is listed after the wipe, and each document is re-read
    /// under its lock in `locks` before it is indexed, so writes that land
    /// during the rebuild are never overwritten with older text. Continues
    /// past per-document failures and reports them.
    ///
    /// # Errors
    ///
    /// Fails if the document store cannot be read. The graph then stays
    /// marked stale until a later rebuild succeeds.
    pub fn rebuild_full_graph(
        &self,
        store: &dyn DocumentStore,
        locks: &DocumentLocks,
    ) -> CoreResult<RebuildReport> {
        let Some(client) = &self.client else {
            return Ok(RebuildReport::skipped("graph store not configured"));
        };
        if let Err(e) = client.ping() {
            self.diagnostics.record_graph_failure("rebuild", &e);
            return Ok(RebuildReport::skipped(format!("graph store unavailable: {e}")));
        }

        if let Err(e) = client.wipe() {
            self.diagnostics.record_graph_failure("rebuild", &e);
            return Ok(RebuildReport::skipped(format!("graph wipe failed: {e}")));
        }
        self.stale.begin_rebuild();
        let ids: Vec<String> = store.list()?.into_iter().map(|doc| doc.id).collect();
        info!(documents = ids.len(), "graph cleared, rebuilding");

        let mut report = RebuildReport {
            status: RebuildStatus::Rebuilt,
            indexed: 0,
            failed: 0,
            errors: Vec::new(),
        };
        for id in &ids {
            let outcome = locks.with_lock(id, || -> CoreResult<bool> {
                let doc = match store.load(id) {
                    Ok(doc) => doc,
                    Err(CoreError::DocumentNotFound { .. }) => return Ok(false),
                    Err(e) => {
                        self.stale.mark(id);
                        return Err(e);
                    }
                };
                match self.upsert(client, &doc.id, &doc.text) {
                    Ok(()) => {
                        self.stale.clear(id);
                        Ok(true)
                    }
                    Err(e) => {
                        self.stale.mark(id);
                        Err(e.into())
                    }
                }
            });
            match outcome {
                Ok(true) => {
                    report.indexed += 1;
                    debug!(document = %id, "indexed");
                }
                Ok(false) => debug!(document = %id, "deleted during rebuild"),
                Err(e) => {
                    warn!(document = %id, error = %e, "failed to index during rebuild");
                    self.diagnostics.record_graph_failure("rebuild", &e);
                    report.failed += 1;
                    report.errors.push(RebuildError {
                        document_id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        self.stale.finish_rebuild();
        info!(
            indexed = report.indexed,
            failed = report.failed,
            "graph rebuild finished"
        );
        Ok(report)
    }

    fn upsert(&self, client: &GraphClient, id: &str, text: &str) -> GraphResult<()> {
        client.upsert_document(&derive_record(id, text, &self.delimiters))
    }
}
