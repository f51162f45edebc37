//! Counters for degraded operation.
//!
//! Graph failures never reach callers; they are counted here instead.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared failure counters.
#[derive(Debug, Default)]
pub struct Diagnostics {
    graph_failures: AtomicU64,
    fallback_answers: AtomicU64,
    skipped_syncs: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Diagnostics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed graph operation.
    pub fn record_graph_failure(&self, op: &str, error: &dyn std::fmt::Display) {
        self.graph_failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock() = Some(format!("{op}: {error}"));
    }

    /// Records a query answered by the fallback index.
    pub fn record_fallback_answer(&self) {
        self.fallback_answers.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a sync that was skipped.
    pub fn record_skipped_sync(&self) {
        self.skipped_syncs.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            graph_failures: self.graph_failures.load(Ordering::Relaxed),
            fallback_answers: self.fallback_answers.load(Ordering::Relaxed),
            skipped_syncs: self.skipped_syncs.load(Ordering::Relaxed),
            last_error: self.last_error.lock().clone(),
        }
    }
}

/// Point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    /// Failed graph operations.
    pub graph_failures: u64,
    /// Queries answered by the fallback index.
    pub fallback_answers: u64,
    /// Index updates skipped because the graph was unavailable.
    pub skipped_syncs: u64,
    /// Most recent graph failure.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_last_error() {
        let d = Diagnostics::new();
        assert_eq!(d.snapshot(), DiagnosticsSnapshot::default());

        d.record_graph_failure("upsert", &"timed out");
        d.record_graph_failure("ping", &"closed");
        d.record_fallback_answer();
        d.record_skipped_sync();

        let s = d.snapshot();
        assert_eq!(s.graph_failures, 2);
        assert_eq!(s.fallback_answers, 1);
        assert_eq!(s.skipped_syncs, 1);
        assert_eq!(s.last_error.as_deref(), Some("ping: closed"));
    }
}
