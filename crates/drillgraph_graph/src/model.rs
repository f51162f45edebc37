//! Graph vocabulary: nodes, relationships, records and query rows.

use serde::{Deserialize, Serialize};

/// A node of the word graph.
///
/// ```text
/// Document -HAS_PARAGRAPH-> Paragraph -HAS_LINE(order)-> Line -HAS_WORD(order, raw)-> Word
/// ```
///
/// `Word` nodes are shared by every line that contains the normalized word,
/// across all documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphNode {
    /// Root of one document's subgraph.
    Document {
        /// Document id.
        id: String,
    },
    /// The full document text.
    Paragraph {
        /// Owning document.
        document_id: String,
        /// Full text at index time.
        text: String,
    },
    /// One indexed line.
    Line {
        /// Owning document.
        document_id: String,
        /// Position among the document's indexed lines.
        index: usize,
        /// Line text.
        text: String,
    },
    /// A normalized word, shared graph-wide.
    Word {
        /// Normalized form; the node's identity.
        normalized: String,
    },
}

impl GraphNode {
    /// Label used in logs and stats.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Document { .. } => "Document",
            Self::Paragraph { .. } => "Paragraph",
            Self::Line { .. } => "Line",
            Self::Word { .. } => "Word",
        }
    }
}

/// A relationship of the word graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphRel {
    /// Document → Paragraph.
    HasParagraph,
    /// Paragraph → Line.
    HasLine {
        /// Line position.
        order: usize,
    },
    /// Line → Word.
    HasWord {
        /// Word position within the line.
        order: usize,
        /// The word as written.
        raw: String,
    },
}

/// Everything the graph stores for one document.
///
/// Built by the caller from the document text; the graph does no text
/// processing of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document id.
    pub document_id: String,
    /// Full text.
    pub paragraph: String,
    /// Indexed lines in order.
    pub lines: Vec<LineRecord>,
}

/// One line of a [`DocumentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line text.
    pub text: String,
    /// Indexed words in order.
    pub words: Vec<WordRecord>,
}

/// One word of a [`LineRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// The word as written.
    pub raw: String,
    /// Join key.
    pub normalized: String,
}

/// A word occurrence reached by walking up from a `Word` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLink {
    /// Owning document.
    pub document_id: String,
    /// Line position.
    pub line_index: usize,
    /// Line text.
    pub line_text: String,
    /// Full document text.
    pub paragraph_text: String,
    /// Word position within the line.
    pub word_index: usize,
    /// The word as written.
    pub raw: String,
}

/// A word reachable from at least two documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedWord {
    /// Normalized word.
    pub word: String,
    /// Owning documents, ascending.
    pub documents: Vec<String>,
    /// Every occurrence, ordered by document, line and word position.
    pub links: Vec<WordLink>,
}

/// Size counters of the graph and its journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// `Document` nodes.
    pub documents: usize,
    /// `Line` nodes.
    pub lines: usize,
    /// Distinct `Word` nodes.
    pub words: usize,
    /// All relationships.
    pub relationships: usize,
    /// Journal size in bytes.
    pub journal_bytes: u64,
}
