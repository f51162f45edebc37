//! # drillgraph storage
//!
//! Byte-level storage backends underneath the drillgraph graph journal.
//!
//! Backends are **opaque byte stores**: they append, read back, flush and
//! truncate. Frame layout, checksums and replay belong to `drillgraph_graph`.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - Ephemeral storage; clones share the same buffer
//! - [`FileBackend`] - Persistent storage using OS file APIs
//! - [`FaultyBackend`] - Wrapper that fails writes on demand, for exercising
//!   degraded paths in tests
//!
//! ## Example
//!
//! ```rust
//! use drillgraph_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"frame").unwrap();
//! assert_eq!(backend.read_at(offset, 5).unwrap(), b"frame");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod faulty;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use faulty::{FaultSwitch, FaultyBackend};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
