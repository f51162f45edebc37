//! Document commands.

use super::{parse_metadata, CliResult, Context};
use std::fs;
use std::path::Path;

/// Lists documents.
pub fn list(ctx: &Context) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let summaries = engine.list_summaries()?;
    ctx.emit(&summaries, |summaries| {
        if summaries.is_empty() {
            println!("No documents");
            return;
        }
        for s in summaries {
            println!("{:<24} {:>4} lines  {}", s.id, s.line_count, s.preview);
        }
    })
}

/// Prints one document.
pub fn show(ctx: &Context, id: &str) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let doc = engine.document(id)?;
    ctx.emit(&doc, |doc| {
        println!("=== {} ===", doc.id);
        if !doc.metadata.is_empty() {
            println!("metadata: {}", serde_json::Value::Object(doc.metadata.clone()));
        }
        println!("{}", doc.text);
    })
}

/// Creates a document from `--text`, `--file` or empty.
pub fn create(
    ctx: &Context,
    id: &str,
    text: Option<String>,
    file: Option<&Path>,
    meta: Option<&str>,
) -> CliResult<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => String::new(),
    };
    let metadata = meta.map(parse_metadata).transpose()?.unwrap_or_default();

    let engine = ctx.open_engine()?;
    let doc = engine.create_document(id, &text, metadata)?;
    ctx.emit(&doc, |doc| println!("Created {}", doc.id))
}

/// Deletes a document.
pub fn delete(ctx: &Context, id: &str) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    engine.delete_document(id)?;
    ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
        println!("Deleted {id}");
    })
}

/// Replaces a document's metadata.
pub fn set_metadata(ctx: &Context, id: &str, json: &str) -> CliResult<()> {
    let metadata = parse_metadata(json)?;
    let engine = ctx.open_engine()?;
    let doc = engine.update_metadata(id, metadata)?;
    ctx.emit(&doc, |doc| println!("Updated metadata of {}", doc.id))
}
