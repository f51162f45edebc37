//! In-memory word graph built on `petgraph`.

use crate::model::{
    DocumentRecord, GraphNode, GraphRel, GraphStats, LineRecord, SharedWord, WordLink, WordRecord,
};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The materialized graph.
///
/// Owns the `petgraph` storage plus two lookup maps: document id → `Document`
/// node and normalized word → `Word` node. A `StableDiGraph` keeps node
/// indices valid across removals, which the lookup maps rely on.
#[derive(Debug, Default)]
pub struct WordGraph {
    graph: StableDiGraph<GraphNode, GraphRel>,
    documents: BTreeMap<String, NodeIndex>,
    words: HashMap<String, NodeIndex>,
}

impl WordGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything owned by `record.document_id` with `record`.
    pub fn upsert(&mut self, record: &DocumentRecord) {
        self.purge(&record.document_id);

        let doc = self.graph.add_node(GraphNode::Document {
            id: record.document_id.clone(),
        });
        let paragraph = self.graph.add_node(GraphNode::Paragraph {
            document_id: record.document_id.clone(),
            text: record.paragraph.clone(),
        });
        self.graph.add_edge(doc, paragraph, GraphRel::HasParagraph);

        for (li, line) in record.lines.iter().enumerate() {
            let line_node = self.graph.add_node(GraphNode::Line {
                document_id: record.document_id.clone(),
                index: li,
                text: line.text.clone(),
            });
            self.graph
                .add_edge(paragraph, line_node, GraphRel::HasLine { order: li });

            for (wi, word) in line.words.iter().enumerate() {
                let word_node = self.merge_word(&word.normalized);
                self.graph.add_edge(
                    line_node,
                    word_node,
                    GraphRel::HasWord {
                        order: wi,
                        raw: word.raw.clone(),
                    },
                );
            }
        }

        self.documents.insert(record.document_id.clone(), doc);
    }

    /// Removes a document's Document, Paragraph and Line nodes with their
    /// relationships. Word nodes are removed only once nothing points at them.
    ///
    /// Returns whether the document was present.
    pub fn purge(&mut self, document_id: &str) -> bool {
        let Some(doc) = self.documents.remove(document_id) else {
            return false;
        };

        let paragraphs: Vec<NodeIndex> = self.children(doc).collect();
        let lines: Vec<NodeIndex> = paragraphs
            .iter()
            .flat_map(|&p| self.children(p).collect::<Vec<_>>())
            .collect();
        let touched: BTreeSet<NodeIndex> = lines
            .iter()
            .flat_map(|&l| self.children(l).collect::<Vec<_>>())
            .collect();

        for node in lines.into_iter().chain(paragraphs).chain([doc]) {
            self.graph.remove_node(node);
        }

        for word in touched {
            let orphan = self
                .graph
                .edges_directed(word, Direction::Incoming)
                .next()
                .is_none();
            if orphan {
                if let Some(GraphNode::Word { normalized }) = self.graph.remove_node(word) {
                    self.words.remove(&normalized);
                }
            }
        }
        true
    }

    /// Drops every node and relationship.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.documents.clear();
        self.words.clear();
    }

    /// Words reachable from two or more documents.
    ///
    /// Ordered by descending document count, then ascending word.
    #[must_use]
    pub fn shared_words(&self) -> Vec<SharedWord> {
        let mut shared: Vec<SharedWord> = self
            .words
            .iter()
            .filter_map(|(word, &node)| {
                let links = self.links_of(node, None);
                let documents: BTreeSet<&str> =
                    links.iter().map(|l| l.document_id.as_str()).collect();
                if documents.len() < 2 {
                    return None;
                }
                Some(SharedWord {
                    word: word.clone(),
                    documents: documents.into_iter().map(str::to_string).collect(),
                    links,
                })
            })
            .collect();

        shared.sort_by(|a, b| {
            b.documents
                .len()
                .cmp(&a.documents.len())
                .then_with(|| a.word.cmp(&b.word))
        });
        shared
    }

    /// Every occurrence of `normalized`, optionally limited to one document.
    #[must_use]
    pub fn word_links(&self, normalized: &str, document_id: Option<&str>) -> Vec<WordLink> {
        self.words
            .get(normalized)
            .map(|&node| self.links_of(node, document_id))
            .unwrap_or_default()
    }

    /// Reassembles the record of one document by walking its subgraph.
    #[must_use]
    pub fn document_record(&self, document_id: &str) -> Option<DocumentRecord> {
        let &doc = self.documents.get(document_id)?;
        let paragraph = self.children(doc).next()?;
        let GraphNode::Paragraph { text, .. } = &self.graph[paragraph] else {
            return None;
        };

        let mut lines: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(paragraph, Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                GraphRel::HasLine { order } => Some((*order, e.target())),
                _ => None,
            })
            .collect();
        lines.sort_unstable();

        let lines = lines
            .into_iter()
            .filter_map(|(_, line)| {
                let GraphNode::Line { text, .. } = &self.graph[line] else {
                    return None;
                };
                let mut words: Vec<(usize, WordRecord)> = self
                    .graph
                    .edges_directed(line, Direction::Outgoing)
                    .filter_map(|e| match (e.weight(), &self.graph[e.target()]) {
                        (GraphRel::HasWord { order, raw }, GraphNode::Word { normalized }) => Some((
                            *order,
                            WordRecord {
                                raw: raw.clone(),
                                normalized: normalized.clone(),
                            },
                        )),
                        _ => None,
                    })
                    .collect();
                words.sort_by_key(|(order, _)| *order);
                Some(LineRecord {
                    text: text.clone(),
                    words: words.into_iter().map(|(_, w)| w).collect(),
                })
            })
            .collect();

        Some(DocumentRecord {
            document_id: document_id.to_string(),
            paragraph: text.clone(),
            lines,
        })
    }

    /// Indexed document ids, ascending.
    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Whether the graph holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Node and relationship counts. `journal_bytes` is left at zero.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let lines = self
            .graph
            .node_weights()
            .filter(|n| matches!(n, GraphNode::Line { .. }))
            .count();
        GraphStats {
            documents: self.documents.len(),
            lines,
            words: self.words.len(),
            relationships: self.graph.edge_count(),
            journal_bytes: 0,
        }
    }

    fn merge_word(&mut self, normalized: &str) -> NodeIndex {
        if let Some(&node) = self.words.get(normalized) {
            return node;
        }
        let node = self.graph.add_node(GraphNode::Word {
            normalized: normalized.to_string(),
        });
        self.words.insert(normalized.to_string(), node);
        node
    }

    fn children(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(node, Direction::Incoming).next()
    }

    /// Walks `Word ← Line ← Paragraph ← Document` for every incoming
    /// `HAS_WORD` relationship of `word`.
    fn links_of(&self, word: NodeIndex, document_id: Option<&str>) -> Vec<WordLink> {
        let mut links: Vec<WordLink> = self
            .graph
            .edges_directed(word, Direction::Incoming)
            .filter_map(|edge| {
                let GraphRel::HasWord { order, raw } = edge.weight() else {
                    return None;
                };
                let line = edge.source();
                let GraphNode::Line { index, text, .. } = &self.graph[line] else {
                    return None;
                };
                let paragraph = self.parent(line)?;
                let GraphNode::Paragraph {
                    text: paragraph_text,
                    ..
                } = &self.graph[paragraph]
                else {
                    return None;
                };
                let doc = self.parent(paragraph)?;
                let GraphNode::Document { id } = &self.graph[doc] else {
                    return None;
                };
                if document_id.is_some_and(|wanted| wanted != id) {
                    return None;
                }
                Some(WordLink {
                    document_id: id.clone(),
                    line_index: *index,
                    line_text: text.clone(),
                    paragraph_text: paragraph_text.clone(),
                    word_index: *order,
                    raw: raw.clone(),
                })
            })
            .collect();

        links.sort_by(|a, b| {
            a.document_id
                .cmp(&b.document_id)
                .then(a.line_index.cmp(&b.line_index))
                .then(a.word_index.cmp(&b.word_index))
        });
        links
    }
}
