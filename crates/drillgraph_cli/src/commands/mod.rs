//! CLI command implementations.

pub mod docs;
pub mod explore;
pub mod links;
pub mod maintenance;
pub mod mutate;

use drillgraph_core::{Config, CoreError, Engine, GraphConfig, JsonDirStore, Metadata};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Graph directory used when `--graph` is not given, relative to the data
/// directory.
pub const DEFAULT_GRAPH_DIR: &str = ".graph";

/// Errors raised by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// No document directory was given.
    #[error("document directory required: pass --data or set DRILLGRAPH_DATA")]
    MissingData,

    /// `--format` was neither `text` nor `json`.
    #[error("unknown output format {0:?}: expected text or json")]
    UnknownFormat(String),

    /// Metadata was not a JSON object.
    #[error("metadata must be a JSON object")]
    MetadataNotObject,

    /// Metadata did not parse.
    #[error("invalid metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),

    /// Engine error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for Format {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Document directory.
    pub data: Option<PathBuf>,
    /// Graph store directory override.
    pub graph: Option<PathBuf>,
    /// Whether to run without a graph store.
    pub no_graph: bool,
    /// Output format.
    pub format: Format,
}

impl Context {
    /// The engine configuration these options describe.
    pub fn config(&self) -> CliResult<Config> {
        if self.no_graph {
            return Ok(Config::default().without_graph());
        }
        let graph = match &self.graph {
            Some(path) => path.clone(),
            None => self.data_dir()?.join(DEFAULT_GRAPH_DIR),
        };
        Ok(Config::default().graph(GraphConfig::directory(graph)))
    }

    /// Opens the engine over the document directory.
    pub fn open_engine(&self) -> CliResult<Engine> {
        let store = JsonDirStore::open(self.data_dir()?)?;
        Ok(Engine::open(self.config()?, Arc::new(store))?)
    }

    fn data_dir(&self) -> CliResult<&Path> {
        self.data.as_deref().ok_or(CliError::MissingData)
    }

    /// Prints `value` as JSON, or through `text` in text mode.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> CliResult<()> {
        match self.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
            Format::Text => text(value),
        }
        Ok(())
    }
}

/// Parses a JSON object into document metadata.
pub fn parse_metadata(json: &str) -> CliResult<Metadata> {
    match serde_json::from_str(json)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(CliError::MetadataNotObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(data: Option<&Path>) -> Context {
        Context {
            data: data.map(Path::to_path_buf),
            graph: None,
            no_graph: false,
            format: Format::Text,
        }
    }

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert!(matches!(
            "yaml".parse::<Format>(),
            Err(CliError::UnknownFormat(_))
        ));
    }

    #[test]
    fn metadata_must_be_an_object() {
        assert_eq!(parse_metadata(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert!(matches!(
            parse_metadata("[1]"),
            Err(CliError::MetadataNotObject)
        ));
        assert!(matches!(
            parse_metadata("{"),
            Err(CliError::MetadataJson(_))
        ));
    }

    #[test]
    fn graph_defaults_under_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = ctx(Some(dir.path())).config().unwrap();
        let graph = config.graph.unwrap();
        assert_eq!(
            graph.location,
            drillgraph_core::GraphLocation::Directory(dir.path().join(DEFAULT_GRAPH_DIR))
        );
    }

    #[test]
    fn missing_data_dir() {
        assert!(matches!(ctx(None).open_engine(), Err(CliError::MissingData)));
    }

    #[test]
    fn engine_opens_on_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ctx(Some(dir.path())).open_engine().unwrap();
        engine
            .create_document("a", "hello", Default::default())
            .unwrap();
        assert!(engine.graph().is_some());
        assert!(dir.path().join("a.json").exists());
    }
}
