//! drillgraph CLI
//!
//! Command-line access to a directory of documents and its word graph.
//!
//! # Commands
//!
//! - `docs` - List, show, create, delete documents and edit their metadata
//! - `split` - Decompose a piece of text at one level
//! - `tree` / `drill` / `up` - Positioned node graphs of a document
//! - `mutate` - Insert, delete or reorder segments at any level
//! - `links` / `traverse` - Words shared between documents
//! - `rebuild` / `compact` / `status` - Graph store maintenance

mod commands;

use clap::{Args, Parser, Subcommand};
use commands::Context;
use drillgraph_core::Edit;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// drillgraph command-line tools.
#[derive(Parser)]
#[command(name = "drillgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding one JSON file per document
    #[arg(global = true, short, long, env = "DRILLGRAPH_DATA")]
    data: Option<PathBuf>,

    /// Graph store directory (default: <data>/.graph)
    #[arg(global = true, short, long, env = "DRILLGRAPH_GRAPH")]
    graph: Option<PathBuf>,

    /// Run on the document scan only, without a graph store
    #[arg(global = true, long)]
    no_graph: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage documents
    Docs {
        #[command(subcommand)]
        action: DocsCommand,
    },

    /// Split text at one level
    Split {
        /// Text to split
        text: String,

        /// Level: 1 lines, 2 words, 3 characters
        #[arg(long, default_value_t = 2)]
        level: u8,

        /// Delimiter override
        #[arg(long)]
        delimiter: Option<String>,
    },

    /// Full node graph of a document
    Tree {
        /// Document id
        id: String,

        /// Levels to expand (1-3)
        #[arg(long)]
        depth: Option<u8>,
    },

    /// One level of a document fanned out under a root
    Drill {
        /// Document id
        id: String,

        /// Level to fan out
        #[arg(long, default_value_t = 1)]
        level: u8,

        /// Text to split at levels 2 and 3
        #[arg(long)]
        parent_text: Option<String>,

        /// Index of the parent element
        #[arg(long)]
        parent_index: Option<usize>,

        /// Delimiter override
        #[arg(long)]
        delimiter: Option<String>,
    },

    /// The view one level above
    Up {
        /// Document id
        id: String,

        /// Level currently shown
        #[arg(long)]
        level: u8,

        /// Line whose words to show when leaving level 3
        #[arg(long)]
        line: Option<usize>,
    },

    /// Edit a document at any level
    Mutate {
        #[command(subcommand)]
        edit: MutateCommand,
    },

    /// Words shared by two or more documents
    Links,

    /// Every occurrence of a word with its line and paragraph
    Traverse {
        /// Word to look up (case-insensitive)
        word: String,

        /// Restrict to one document
        #[arg(long)]
        document: Option<String>,
    },

    /// Wipe the graph store and index every document
    Rebuild,

    /// Rewrite the graph journal
    Compact,

    /// Graph availability, backend and counters
    Status,

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum DocsCommand {
    /// List documents with line counts and previews
    List,

    /// Print one document
    Show {
        /// Document id
        id: String,
    },

    /// Create a document
    Create {
        /// Document id
        id: String,

        /// Document text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Metadata as a JSON object
        #[arg(long)]
        meta: Option<String>,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },

    /// Replace a document's metadata
    Meta {
        /// Document id
        id: String,

        /// Metadata as a JSON object
        json: String,
    },
}

/// Which segment list an edit targets.
#[derive(Args)]
struct AddressArgs {
    /// Level of the edited segments
    #[arg(long, default_value_t = 1)]
    level: u8,

    /// Parent line, for levels 2 and 3
    #[arg(long)]
    line: Option<usize>,

    /// Parent word, for level 3
    #[arg(long)]
    word: Option<usize>,
}

#[derive(Subcommand)]
enum MutateCommand {
    /// Insert a segment (position is clamped)
    Insert {
        /// Document id
        id: String,
        /// Position to insert at
        position: usize,
        /// Segment to insert
        value: String,
        #[command(flatten)]
        at: AddressArgs,
    },

    /// Delete a segment (out of range is a no-op)
    Delete {
        /// Document id
        id: String,
        /// Position to delete
        position: usize,
        #[command(flatten)]
        at: AddressArgs,
    },

    /// Move a segment
    Reorder {
        /// Document id
        id: String,
        /// Current position
        from: usize,
        /// New position
        to: usize,
        #[command(flatten)]
        at: AddressArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        data: cli.data,
        graph: cli.graph,
        no_graph: cli.no_graph,
        format: cli.format.parse()?,
    };

    match cli.command {
        Commands::Docs { action } => match action {
            DocsCommand::List => commands::docs::list(&ctx)?,
            DocsCommand::Show { id } => commands::docs::show(&ctx, &id)?,
            DocsCommand::Create {
                id,
                text,
                file,
                meta,
            } => commands::docs::create(&ctx, &id, text, file.as_deref(), meta.as_deref())?,
            DocsCommand::Delete { id } => commands::docs::delete(&ctx, &id)?,
            DocsCommand::Meta { id, json } => commands::docs::set_metadata(&ctx, &id, &json)?,
        },
        Commands::Split {
            text,
            level,
            delimiter,
        } => commands::explore::split(&ctx, &text, level, delimiter.as_deref())?,
        Commands::Tree { id, depth } => commands::explore::tree(&ctx, &id, depth)?,
        Commands::Drill {
            id,
            level,
            parent_text,
            parent_index,
            delimiter,
        } => commands::explore::drill(&ctx, &id, level, parent_text, parent_index, delimiter)?,
        Commands::Up { id, level, line } => commands::explore::up(&ctx, &id, level, line)?,
        Commands::Mutate { edit } => {
            let (id, at, edit) = match edit {
                MutateCommand::Insert {
                    id,
                    position,
                    value,
                    at,
                } => (id, at, Edit::Insert { position, value }),
                MutateCommand::Delete { id, position, at } => {
                    (id, at, Edit::Delete { position })
                }
                MutateCommand::Reorder { id, from, to, at } => {
                    (id, at, Edit::Reorder { from, to })
                }
            };
            commands::mutate::run(&ctx, &id, at.level, at.line, at.word, edit)?;
        }
        Commands::Links => commands::links::links(&ctx)?,
        Commands::Traverse { word, document } => {
            commands::links::traverse(&ctx, &word, document.as_deref())?
        }
        Commands::Rebuild => commands::maintenance::rebuild(&ctx)?,
        Commands::Compact => commands::maintenance::compact(&ctx)?,
        Commands::Status => commands::maintenance::status(&ctx)?,
        Commands::Version => {
            println!("drillgraph CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("drillgraph core v{}", drillgraph_core::VERSION);
        }
    }

    Ok(())
}
