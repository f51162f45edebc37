//! Graph store maintenance: rebuild, compact, status.

use super::{CliResult, Context};
use drillgraph_core::RebuildStatus;

/// Wipes the graph and indexes every document.
pub fn rebuild(ctx: &Context) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let report = engine.rebuild_index()?;
    ctx.emit(&report, |report| {
        match &report.status {
            RebuildStatus::Rebuilt => println!(
                "Rebuilt: {} indexed, {} failed",
                report.indexed, report.failed
            ),
            RebuildStatus::Skipped { reason } => println!("Skipped: {reason}"),
        }
        for e in &report.errors {
            println!("  {}: {}", e.document_id, e.error);
        }
    })
}

/// Rewrites the graph journal.
pub fn compact(ctx: &Context) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let before = engine
        .graph()
        .map(|g| g.stats())
        .transpose()
        .map_err(drillgraph_core::CoreError::from)?;
    let after = engine.compact_graph()?;
    ctx.emit(&after, |after| {
        if let Some(before) = &before {
            println!(
                "Journal: {} -> {} bytes",
                before.journal_bytes, after.journal_bytes
            );
        }
        println!(
            "{} documents, {} lines, {} words",
            after.documents, after.lines, after.words
        );
    })
}

/// Prints graph availability, the active backend and counters.
pub fn status(ctx: &Context) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let status = engine.status()?;
    ctx.emit(&status, |status| {
        println!("=== drillgraph status ===");
        println!("Documents:        {}", status.documents);
        println!("Graph available:  {}", status.graph_available);
        println!("Cross-link index: {}", status.backend);
        if let Some(graph) = &status.graph {
            println!(
                "Graph:            {} documents, {} lines, {} words, {} relationships",
                graph.documents, graph.lines, graph.words, graph.relationships
            );
            println!("Journal size:     {} bytes", graph.journal_bytes);
        }
        if !status.stale_documents.is_empty() {
            println!("Stale documents:  {}", status.stale_documents.join(", "));
        }
        let d = &status.diagnostics;
        println!("Graph failures:   {}", d.graph_failures);
        println!("Fallback answers: {}", d.fallback_answers);
        println!("Skipped syncs:    {}", d.skipped_syncs);
        if let Some(last) = &d.last_error {
            println!("Last error:       {last}");
        }
    })
}
