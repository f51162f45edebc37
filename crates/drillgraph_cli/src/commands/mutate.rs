//! Mutate command implementation.

use super::{CliResult, Context};
use drillgraph_core::{Address, Edit, Level, Mutation, SyncStatus};

/// Applies one edit to a document and prints the new text.
pub fn run(
    ctx: &Context,
    id: &str,
    level: u8,
    line: Option<usize>,
    word: Option<usize>,
    edit: Edit,
) -> CliResult<()> {
    let address = Address {
        level: Level::try_from(level)?,
        line,
        word,
    };
    let mutation = Mutation::new(address, edit);

    let engine = ctx.open_engine()?;
    let result = engine.mutate(id, &mutation)?;
    ctx.emit(&result, |result| {
        if !result.applied {
            println!("Nothing to delete; {} unchanged", result.document_id);
            return;
        }
        if result.index == Some(SyncStatus::Skipped) {
            println!("(graph index not updated; run `drillgraph rebuild`)");
        }
        println!("{}", result.text);
    })
}
