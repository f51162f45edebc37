//! Decomposition and node graph commands.

use super::{CliResult, Context};
use drillgraph_core::{
    split as split_text, Delimiters, DrillRequest, FlowGraph, Level, NavigateUp,
};

/// Splits `text` at `level` without touching any store.
pub fn split(ctx: &Context, text: &str, level: u8, delimiter: Option<&str>) -> CliResult<()> {
    let level = Level::try_from(level)?;
    let defaults = Delimiters::default();
    let delimiter = delimiter.unwrap_or_else(|| defaults.get(level));
    let parts = split_text(text, delimiter, level);
    ctx.emit(&parts, |parts| {
        for (i, part) in parts.iter().enumerate() {
            println!("{i:>4}  {part:?}");
        }
    })
}

/// Prints the full node graph of a document.
pub fn tree(ctx: &Context, id: &str, depth: Option<u8>) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let graph = engine.build_tree(id, depth)?;
    ctx.emit(&graph, print_graph)
}

/// Fans out one level of a document.
pub fn drill(
    ctx: &Context,
    id: &str,
    level: u8,
    parent_text: Option<String>,
    parent_index: Option<usize>,
    delimiter: Option<String>,
) -> CliResult<()> {
    let level = Level::try_from(level)?;
    let mut request =
        DrillRequest::segments(id, level, parent_text.unwrap_or_default(), parent_index);
    if let Some(delimiter) = delimiter {
        request = request.with_delimiter(delimiter);
    }

    let engine = ctx.open_engine()?;
    let view = engine.drill_down(&request)?;
    ctx.emit(&view, |view| {
        println!("level {} of {} ({:?})", view.level, view.document_id, view.parent_text);
        print_graph(&view.graph);
    })
}

/// Prints the view one level above `level`.
pub fn up(ctx: &Context, id: &str, level: u8, line: Option<usize>) -> CliResult<()> {
    let level = Level::try_from(level)?;
    let engine = ctx.open_engine()?;
    let result = engine.navigate_up(id, level, line)?;
    ctx.emit(&result, |result| match result {
        NavigateUp::AtTop => println!("Already at the top; back to the document list"),
        NavigateUp::View(view) => {
            println!("level {} of {} ({:?})", view.level, view.document_id, view.parent_text);
            print_graph(&view.graph);
        }
    })
}

fn print_graph(graph: &FlowGraph) {
    for node in &graph.nodes {
        let indent = "  ".repeat(usize::from(node.data.level));
        println!(
            "{indent}{} [{}] @({}, {})",
            node.data.label, node.id, node.position.x, node.position.y
        );
    }
    println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
}
