//! Tracking where the graph store lags behind the document store.
//!
//! A failed upsert or purge leaves the graph describing text that is no
//! longer stored. Until that document is indexed again, or a rebuild
//! completes, graph answers cannot be trusted.

use parking_lot::Mutex;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
struct StaleState {
    documents: BTreeSet<String>,
    rebuilding: bool,
}

/// Documents whose graph representation is out of date.
#[derive(Debug, Default)]
pub struct StaleTracker {
    state: Mutex<StaleState>,
}

impl StaleTracker {
    /// Creates a tracker with nothing stale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the graph no longer matches `id`.
    pub fn mark(&self, id: &str) {
        self.state.lock().documents.insert(id.to_string());
    }

    /// Records that the graph matches `id` again.
    pub fn clear(&self, id: &str) {
        self.state.lock().documents.remove(id);
    }

    /// The graph was wiped; every document is missing until the rebuild
    /// finishes.
    pub fn begin_rebuild(&self) {
        let mut state = self.state.lock();
        state.documents.clear();
        state.rebuilding = true;
    }

    /// The rebuild visited every document. Failed ones stay marked.
    pub fn finish_rebuild(&self) {
        self.state.lock().rebuilding = false;
    }

    /// Whether any graph answer may be out of date.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let state = self.state.lock();
        state.rebuilding || !state.documents.is_empty()
    }

    /// Ids currently marked, ascending.
    #[must_use]
    pub fn documents(&self) -> Vec<String> {
        self.state.lock().documents.iter().cloned().collect()
    }
}
