//! Cross-link commands.

use super::{CliResult, Context};

/// Prints every word shared by two or more documents.
pub fn links(ctx: &Context) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let entries = engine.cross_links()?;
    ctx.emit(&entries, |entries| {
        if entries.is_empty() {
            println!("No shared words");
            return;
        }
        for entry in entries {
            println!(
                "{:<20} {} documents: {}",
                entry.word,
                entry.documents.len(),
                entry.documents.join(", ")
            );
        }
    })
}

/// Prints where `word` occurs.
pub fn traverse(ctx: &Context, word: &str, document: Option<&str>) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let traces = engine.traverse(word, document)?;
    ctx.emit(&traces, |traces| {
        for t in traces {
            println!(
                "{} line {} word {}: {:?}  in {:?}",
                t.document_id, t.line_index, t.word_index, t.raw, t.line_text
            );
        }
        println!("{} occurrences", traces.len());
    })
}
