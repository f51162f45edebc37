//! # drillgraph core
//!
//! Decomposes text documents into a paragraph → line → word → character
//! hierarchy, lays that hierarchy out as positioned node/edge graphs, edits
//! it at any level, and keeps a cross-document index of shared words.
//!
//! ## Components
//!
//! - [`split`] / [`join`]: the decomposer
//! - [`build_tree`] / [`build_level_nodes`]: the tree builder
//! - [`apply_mutation`] and the [`insert_at`] / [`delete_at`] / [`reorder`]
//!   primitives: the mutation engine
//! - [`CrossLinkIndex`]: shared words, answered by the graph store
//!   ([`GraphCrossLinkIndex`]) or by scanning documents
//!   ([`FallbackCrossLinkIndex`])
//! - [`IndexSynchronizer`]: writes document changes through to the graph
//! - [`Engine`]: the facade over all of the above
//!
//! The [`DocumentStore`] is authoritative. The graph store is derived data:
//! when it is missing or failing, queries are answered from the documents
//! and index updates are skipped until the next rebuild.
//!
//! ## Example
//!
//! ```rust
//! use drillgraph_core::{Config, Engine, MemoryDocumentStore};
//! use std::sync::Arc;
//!
//! let engine = Engine::open(Config::default(), Arc::new(MemoryDocumentStore::new())).unwrap();
//! engine.create_document("a", "the cat sat", Default::default()).unwrap();
//! engine.create_document("b", "The cat ran", Default::default()).unwrap();
//!
//! let links = engine.cross_links().unwrap();
//! assert_eq!(links[0].word, "cat");
//! assert_eq!(links[0].documents, vec!["a", "b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod crosslink;
mod decompose;
mod diagnostics;
mod engine;
mod error;
mod level;
mod locks;
mod mutate;
mod stale;
mod store;
mod sync;
mod tree;

pub use config::Config;
pub use crosslink::{
    derive_record, normalize_word, select_index, CrossLinkEntry, CrossLinkIndex,
    FallbackCrossLinkIndex, GraphCrossLinkIndex, IndexBackend, ParentTrace, WordOccurrence,
};
pub use decompose::{join, split, Delimiters};
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use engine::{
    DocumentSummary, DrillRequest, Engine, EngineStatus, LevelView, MutationResult, NavigateUp,
};
pub use error::{CoreError, CoreResult};
pub use level::Level;
pub use locks::DocumentLocks;
pub use mutate::{
    apply_mutation, delete_at, insert_at, reorder, Address, Edit, Mutation, MutationOutcome,
};
pub use stale::StaleTracker;
pub use store::{validate_document_id, Document, DocumentStore, JsonDirStore, Metadata, MemoryDocumentStore};
pub use sync::{IndexSynchronizer, RebuildError, RebuildReport, RebuildStatus, SyncStatus};
pub use tree::{build_level_nodes, build_tree, Edge, FlowGraph, Node, NodeData, NodeKind, Position};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-exported graph store types used in the public API.
pub use drillgraph_graph::{GraphClient, GraphConfig, GraphError, GraphLocation, GraphStats};
