//! Graph store configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Where the graph store keeps its journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphLocation {
    /// A store directory holding `LOCK` and `graph.journal`.
    Directory(PathBuf),
    /// Nothing persisted; the graph lives as long as the client.
    InMemory,
}

/// Configuration for connecting a [`GraphClient`](crate::GraphClient).
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Journal location.
    pub location: GraphLocation,

    /// Whether to create the store directory if it is missing.
    pub create_if_missing: bool,

    /// How long `connect` keeps retrying the directory lock.
    pub connect_timeout: Duration,

    /// How long a single operation waits for the state lock.
    pub operation_timeout: Duration,

    /// Whether to fsync the journal after every write.
    pub sync_on_write: bool,

    /// Largest journal frame accepted, in bytes.
    pub max_frame_bytes: usize,

    /// Whether a corrupted journal is discarded on open instead of failing.
    ///
    /// The graph is derived data; a discarded journal is refilled by the next
    /// rebuild.
    pub reset_on_corruption: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            location: GraphLocation::InMemory,
            create_if_missing: true,
            connect_timeout: Duration::from_secs(2),
            operation_timeout: Duration::from_secs(5),
            sync_on_write: true,
            max_frame_bytes: 64 * 1024 * 1024, // 64 MiB
            reset_on_corruption: true,
        }
    }
}

impl GraphConfig {
    /// Configuration for an in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration for a store directory.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            location: GraphLocation::Directory(path.into()),
            ..Self::default()
        }
    }

    /// Sets whether a missing directory is created.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout.
    #[must_use]
    pub const fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets whether every write is synced.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the frame size limit.
    #[must_use]
    pub const fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.max_frame_bytes = bytes;
        self
    }

    /// Sets whether a corrupted journal is discarded on open.
    #[must_use]
    pub const fn reset_on_corruption(mut self, value: bool) -> Self {
        self.reset_on_corruption = value;
        self
    }
}
