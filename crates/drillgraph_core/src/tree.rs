//! Positioned node/edge graphs for exploring a document.
//!
//! Two layouts are produced:
//!
//! - [`build_tree`]: the whole hierarchy down to a depth, in one graph.
//! - [`build_level_nodes`]: one level fanned out under a synthetic root.
//!
//! Positions are a pure function of segment indices; the same input always
//! yields the same graph. Graphs are never stored.

use crate::decompose::{split, Delimiters};
use crate::error::CoreResult;
use crate::level::Level;
use serde::Serialize;

const LINE_X_GAP: f64 = 320.0;
const LINE_Y: f64 = 130.0;
const MIN_TREE_WIDTH: f64 = 600.0;
const ROOT_X_OFFSET: f64 = 60.0;
const WORD_X_STAGGER: f64 = 140.0;
const WORD_Y_OFFSET: f64 = 120.0;
const WORD_Y_GAP: f64 = 70.0;
const CHAR_X_GAP: f64 = 60.0;
const CHAR_Y_OFFSET: f64 = 80.0;

const LEVEL_ROOT_X: f64 = 250.0;
const LEVEL_X_START: f64 = 50.0;
const LEVEL_X_GAP: f64 = 200.0;
const LEVEL_Y_START: f64 = 120.0;
const LEVEL_Y_GAP: f64 = 90.0;

/// A set of positioned nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    /// Nodes, parents before children.
    pub nodes: Vec<Node>,
    /// Edges, in node order.
    pub edges: Vec<Edge>,
}

impl FlowGraph {
    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks a node up by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Adds `node`, linked from `parent` as `(edge id, source, animated)`.
    fn push(&mut self, node: Node, parent: Option<(String, &str, bool)>) {
        if let Some((id, source, animated)) = parent {
            self.edges.push(Edge {
                id,
                source: source.to_string(),
                target: node.id.clone(),
                animated,
            });
        }
        self.nodes.push(node);
    }
}

/// Whether a node is an entry point or a regular child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The root of a graph.
    Input,
    /// Any other node.
    Default,
}

/// A 2D position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Unique within its graph.
    pub id: String,
    /// Root or child.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Payload.
    pub data: NodeData,
    /// Position.
    pub position: Position,
}

/// The payload of a [`Node`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Display text.
    pub label: String,
    /// 0 for a root, else the segment's level.
    pub level: u8,
    /// Position among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Line the node belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_index: Option<usize>,
    /// Word the node belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_index: Option<usize>,
    /// Owning document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Full text the root stands for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Whether the node can be expanded further.
    pub can_drill_down: bool,
    /// Level reached by expanding the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level: Option<Level>,
    /// Whether this is the graph's root.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_root: bool,
}

/// A parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Unique within its graph.
    pub id: String,
    /// Parent node id.
    pub source: String,
    /// Child node id.
    pub target: String,
    /// Set when the target can be drilled into.
    pub animated: bool,
}

fn segment_data(label: &str, level: Level, document_id: &str) -> NodeData {
    NodeData {
        label: label.to_string(),
        level: level.number(),
        document_id: Some(document_id.to_string()),
        can_drill_down: level.next().is_some(),
        next_level: level.next(),
        ..NodeData::default()
    }
}

/// Builds the full hierarchy of `text` down to `depth` (1 = lines,
/// 2 = words, 3 = characters).
///
/// Blank text yields an empty graph.
///
/// # Errors
///
/// [`CoreError::InvalidLevel`](crate::CoreError::InvalidLevel) if `depth`
/// is not 1, 2 or 3.
///
/// # Example
///
/// ```rust
/// use drillgraph_core::{build_tree, Delimiters};
///
/// let graph = build_tree("doc", "hello world", &Delimiters::default(), 2).unwrap();
/// assert_eq!(graph.nodes.len(), 4);
/// assert_eq!(graph.edges.len(), 3);
/// ```
pub fn build_tree(
    document_id: &str,
    text: &str,
    delimiters: &Delimiters,
    depth: u8,
) -> CoreResult<FlowGraph> {
    let depth = Level::try_from(depth)?;
    let mut graph = FlowGraph::default();
    if text.trim().is_empty() {
        return Ok(graph);
    }

    let lines = split(text, &delimiters.line, Level::Lines);
    let total_width = (lines.len() as f64 * LINE_X_GAP).max(MIN_TREE_WIDTH);

    graph.push(
        Node {
            id: "para".to_string(),
            kind: NodeKind::Input,
            data: NodeData {
                label: "Paragraph".to_string(),
                document_id: Some(document_id.to_string()),
                can_drill_down: true,
                next_level: Some(Level::Lines),
                is_root: true,
                ..NodeData::default()
            },
            position: Position {
                x: total_width / 2.0 - ROOT_X_OFFSET,
                y: 0.0,
            },
        },
        None,
    );

    for (li, line) in lines.iter().enumerate() {
        let line_id = format!("L{li}");
        let line_x = li as f64 * LINE_X_GAP + 30.0;
        graph.push(
            Node {
                id: line_id.clone(),
                kind: NodeKind::Default,
                data: NodeData {
                    index: Some(li),
                    ..segment_data(line, Level::Lines, document_id)
                },
                position: Position {
                    x: line_x,
                    y: LINE_Y,
                },
            },
            Some((format!("e-para-{line_id}"), "para", true)),
        );
        if depth < Level::Words {
            continue;
        }

        for (wi, word) in split(line, &delimiters.word, Level::Words).iter().enumerate() {
            let word_id = format!("{line_id}-W{wi}");
            let word_x = line_x + (wi % 2) as f64 * WORD_X_STAGGER - 30.0;
            let word_y = LINE_Y + WORD_Y_OFFSET + wi as f64 * WORD_Y_GAP;
            graph.push(
                Node {
                    id: word_id.clone(),
                    kind: NodeKind::Default,
                    data: NodeData {
                        index: Some(wi),
                        line_index: Some(li),
                        ..segment_data(word, Level::Words, document_id)
                    },
                    position: Position {
                        x: word_x,
                        y: word_y,
                    },
                },
                Some((format!("e-{word_id}"), &line_id, true)),
            );
            if depth < Level::Chars {
                continue;
            }

            let chars = split(word, &delimiters.char, Level::Chars);
            let span = chars.len().saturating_sub(1) as f64 * CHAR_X_GAP / 2.0;
            for (ci, ch) in chars.iter().enumerate() {
                let char_id = format!("{word_id}-C{ci}");
                graph.push(
                    Node {
                        id: char_id.clone(),
                        kind: NodeKind::Default,
                        data: NodeData {
                            index: Some(ci),
                            line_index: Some(li),
                            word_index: Some(wi),
                            ..segment_data(ch, Level::Chars, document_id)
                        },
                        position: Position {
                            x: word_x - span + ci as f64 * CHAR_X_GAP,
                            y: word_y + CHAR_Y_OFFSET,
                        },
                    },
                    Some((format!("e-{char_id}"), &word_id, false)),
                );
            }
        }
    }

    Ok(graph)
}

/// Builds a single-level view: `parts` fanned out under a root labelled
/// after the parent element.
///
/// Items are laid out in a grid of one column up to 4 items, two up to 8,
/// and three beyond.
#[must_use]
pub fn build_level_nodes<S: AsRef<str>>(
    parts: &[S],
    level: Level,
    document_id: &str,
    parent_text: &str,
    parent_index: Option<usize>,
) -> FlowGraph {
    let mut graph = FlowGraph::default();
    if parts.is_empty() {
        return graph;
    }

    graph.nodes.push(Node {
        id: "root".to_string(),
        kind: NodeKind::Input,
        data: NodeData {
            label: level.parent_label().to_string(),
            index: parent_index,
            document_id: Some(document_id.to_string()),
            text: Some(parent_text.to_string()),
            is_root: true,
            ..NodeData::default()
        },
        position: Position {
            x: LEVEL_ROOT_X,
            y: 0.0,
        },
    });

    let cols = match parts.len() {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    };
    for (i, part) in parts.iter().enumerate() {
        let (row, col) = (i / cols, i % cols);
        let id = format!("n-{i}");
        graph.edges.push(Edge {
            id: format!("e-{i}"),
            source: "root".to_string(),
            target: id.clone(),
            animated: level < Level::Chars,
        });
        graph.nodes.push(Node {
            id,
            kind: NodeKind::Default,
            data: NodeData {
                index: Some(i),
                ..segment_data(part.as_ref(), level, document_id)
            },
            position: Position {
                x: LEVEL_X_START + col as f64 * LEVEL_X_GAP,
                y: LEVEL_Y_START + row as f64 * LEVEL_Y_GAP,
            },
        });
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn tree(text: &str, depth: u8) -> FlowGraph {
        build_tree("doc", text, &Delimiters::default(), depth).unwrap()
    }

    fn pos(graph: &FlowGraph, id: &str) -> (f64, f64) {
        let p = graph.node(id).unwrap().position;
        (p.x, p.y)
    }

    #[test]
    fn two_words_at_depth_two() {
        let g = tree("hello world", 2);
        let ids: Vec<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["para", "L0", "L0-W0", "L0-W1"]);
        let edges: Vec<&str> = g.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges, vec!["e-para-L0", "e-L0-W0", "e-L0-W1"]);
        assert!(g.edges.iter().all(|e| e.animated));
    }

    #[test]
    fn geometry() {
        let g = tree("ab cd\nxyz", 3);
        // total width = max(2 * 320, 600) = 640
        assert_eq!(pos(&g, "para"), (260.0, 0.0));
        assert_eq!(pos(&g, "L0"), (30.0, 130.0));
        assert_eq!(pos(&g, "L1"), (350.0, 130.0));
        assert_eq!(pos(&g, "L0-W0"), (0.0, 250.0));
        assert_eq!(pos(&g, "L0-W1"), (140.0, 320.0));
        assert_eq!(pos(&g, "L0-W0-C0"), (-30.0, 330.0));
        assert_eq!(pos(&g, "L0-W0-C1"), (30.0, 330.0));
        assert_eq!(pos(&g, "L1-W0-C0"), (260.0, 330.0));
    }

    #[test]
    fn narrow_documents_use_minimum_width() {
        let g = tree("one", 1);
        assert_eq!(pos(&g, "para"), (240.0, 0.0));
    }

    #[test]
    fn depth_truncates() {
        let g = tree("a b\nc", 1);
        assert_eq!(g.nodes.len(), 3);
        assert!(g.nodes.iter().all(|n| n.data.level <= 1));
    }

    #[test]
    fn char_edges_are_static_and_chars_are_leaves() {
        let g = tree("hi", 3);
        let c0 = g.node("L0-W0-C0").unwrap();
        assert!(!c0.data.can_drill_down);
        assert_eq!(c0.data.next_level, None);
        assert_eq!(c0.data.line_index, Some(0));
        assert_eq!(c0.data.word_index, Some(0));
        let edge = g.edges.iter().find(|e| e.target == "L0-W0-C0").unwrap();
        assert!(!edge.animated);

        let w0 = g.node("L0-W0").unwrap();
        assert!(w0.data.can_drill_down);
        assert_eq!(w0.data.next_level, Some(Level::Chars));
    }

    #[test]
    fn blank_text_is_empty_graph() {
        assert!(tree("", 3).is_empty());
        assert!(tree("  \n\t ", 3).is_empty());
    }

    #[test]
    fn invalid_depth() {
        for depth in [0, 4] {
            let result = build_tree("doc", "x", &Delimiters::default(), depth);
            assert!(matches!(result, Err(CoreError::InvalidLevel { .. })));
        }
    }

    #[test]
    fn custom_char_delimiter() {
        let d = Delimiters::default().with(Level::Chars, "-");
        let g = build_tree("doc", "ab-c", &d, 3).unwrap();
        assert_eq!(g.node("L0-W0-C0").unwrap().data.label, "ab");
        assert_eq!(g.node("L0-W0-C1").unwrap().data.label, "c");
    }

    #[test]
    fn level_view_grid() {
        let parts: Vec<String> = (0..9).map(|i| format!("p{i}")).collect();
        let g = build_level_nodes(&parts, Level::Words, "doc", "p0 p1", Some(2));

        assert_eq!(g.nodes[0].id, "root");
        assert_eq!(g.nodes[0].data.label, "Line");
        assert_eq!(g.nodes[0].data.index, Some(2));
        // 9 items → 3 columns
        assert_eq!(pos(&g, "n-4"), (250.0, 210.0));
        assert_eq!(pos(&g, "n-8"), (450.0, 300.0));
        assert!(g.edges.iter().all(|e| e.animated));
        assert!(g.node("n-0").unwrap().data.can_drill_down);
    }

    #[test]
    fn level_view_columns() {
        let five = ["a", "b", "c", "d", "e"];
        let g = build_level_nodes(&five, Level::Lines, "doc", "", None);
        assert_eq!(pos(&g, "n-1"), (250.0, 120.0));
        assert_eq!(pos(&g, "n-4"), (50.0, 300.0));

        let four = ["a", "b", "c", "d"];
        let g = build_level_nodes(&four, Level::Lines, "doc", "", None);
        assert_eq!(pos(&g, "n-3"), (50.0, 390.0));
    }

    #[test]
    fn level_view_chars_are_static() {
        let g = build_level_nodes(&["x", "y"], Level::Chars, "doc", "xy", Some(0));
        assert_eq!(g.nodes[0].data.label, "Word");
        assert!(g.edges.iter().all(|e| !e.animated));
        assert!(!g.node("n-1").unwrap().data.can_drill_down);
    }

    #[test]
    fn level_view_empty() {
        assert!(build_level_nodes::<&str>(&[], Level::Lines, "doc", "", None).is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let g = tree("hi", 2);
        let json = serde_json::to_value(&g).unwrap();
        let word = &json["nodes"][2];
        assert_eq!(word["type"], "default");
        assert_eq!(word["data"]["lineIndex"], 0);
        assert_eq!(word["data"]["canDrillDown"], true);
        assert_eq!(word["data"]["nextLevel"], 3);
        assert_eq!(json["nodes"][0]["data"]["isRoot"], true);
    }
}
