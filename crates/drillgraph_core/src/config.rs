//! Engine configuration.

use crate::decompose::Delimiters;
use crate::level::Level;
use drillgraph_graph::GraphConfig;

/// Configuration for opening an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct Config {
    /// Delimiters for all three levels.
    pub delimiters: Delimiters,

    /// Depth of [`Engine::build_tree`](crate::Engine::build_tree) when the
    /// caller does not pass one.
    pub default_depth: u8,

    /// Graph store to connect to, or `None` to run on the in-memory
    /// fallback index only.
    pub graph: Option<GraphConfig>,

    /// Whether opening the engine indexes every document into an empty
    /// graph store.
    pub index_on_startup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            default_depth: 3,
            graph: Some(GraphConfig::in_memory()),
            index_on_startup: true,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paragraph → line delimiter.
    #[must_use]
    pub fn line_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiters = self.delimiters.with(Level::Lines, delimiter);
        self
    }

    /// Sets the line → word delimiter.
    #[must_use]
    pub fn word_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiters = self.delimiters.with(Level::Words, delimiter);
        self
    }

    /// Sets the word → character delimiter.
    #[must_use]
    pub fn char_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiters = self.delimiters.with(Level::Chars, delimiter);
        self
    }

    /// Sets the default tree depth.
    #[must_use]
    pub const fn default_depth(mut self, depth: u8) -> Self {
        self.default_depth = depth;
        self
    }

    /// Sets the graph store configuration.
    #[must_use]
    pub fn graph(mut self, graph: GraphConfig) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Runs without a graph store.
    #[must_use]
    pub fn without_graph(mut self) -> Self {
        self.graph = None;
        self
    }

    /// Sets whether an empty graph store is filled on open.
    #[must_use]
    pub const fn index_on_startup(mut self, value: bool) -> Self {
        self.index_on_startup = value;
        self
    }
}
