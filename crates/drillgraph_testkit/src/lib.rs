//! # drillgraph testkit
//!
//! Test utilities for drillgraph.
//!
//! This crate provides:
//! - Engine fixtures over in-memory and file-backed stores
//! - Property-based generators for words, lines and corpora
//! - Contract assertions comparing the two cross-link backends
//! - A concurrent mutation stress runner
//!
//! ## Usage
//!
//! ```rust
//! use drillgraph_testkit::prelude::*;
//!
//! with_temp_engine(|engine| {
//!     engine.create_document("a", "hello world", Default::default()).unwrap();
//!     assert_eq!(engine.list_summaries().unwrap().len(), 1);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::contract::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use contract::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
