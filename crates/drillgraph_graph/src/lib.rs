//! # drillgraph graph
//!
//! An embedded property graph that links words across documents.
//!
//! ```text
//! Document -HAS_PARAGRAPH-> Paragraph -HAS_LINE-> Line -HAS_WORD-> Word
//! ```
//!
//! `Word` nodes are keyed by their normalized form and shared between every
//! line that uses them, so a word appearing in two documents is one node
//! with two parent chains.
//!
//! The graph lives in memory (`petgraph`). Every change is first appended to
//! a checksummed journal of CBOR frames, which is replayed on connect. A
//! directory store holds an advisory `LOCK` for the lifetime of the client.
//!
//! ## Example
//!
//! ```rust
//! use drillgraph_graph::{DocumentRecord, GraphClient, LineRecord, WordRecord};
//!
//! let client = GraphClient::in_memory().unwrap();
//! for id in ["a", "b"] {
//!     client.upsert_document(&DocumentRecord {
//!         document_id: id.into(),
//!         paragraph: "Hello".into(),
//!         lines: vec![LineRecord {
//!             text: "Hello".into(),
//!             words: vec![WordRecord { raw: "Hello".into(), normalized: "hello".into() }],
//!         }],
//!     }).unwrap();
//! }
//! assert_eq!(client.shared_words().unwrap()[0].documents, vec!["a", "b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod dir;
mod error;
mod graph;
mod journal;
mod model;

pub use client::GraphClient;
pub use config::{GraphConfig, GraphLocation};
pub use dir::GraphDir;
pub use error::{GraphError, GraphResult};
pub use graph::WordGraph;
pub use journal::{compute_crc32, encode_frame, scan_frames, JournalOp, ScanEnd, FRAME_MAGIC};
pub use model::{
    DocumentRecord, GraphNode, GraphRel, GraphStats, LineRecord, SharedWord, WordLink, WordRecord,
};
