//! Test fixtures and engine helpers.

use drillgraph_core::{
    Config, Document, DocumentStore, Engine, GraphClient, GraphConfig, JsonDirStore,
    MemoryDocumentStore,
};
use drillgraph_storage::{FaultSwitch, FaultyBackend, InMemoryBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// The two-document corpus used throughout the docs.
pub const SAMPLE_CORPUS: [(&str, &str); 2] = [
    ("A", "the cat sat\nthe dog ran"),
    ("B", "the cat ran fast"),
];

/// A test engine with automatic cleanup.
pub struct TestEngine {
    /// The engine.
    pub engine: Engine,
    /// Switch that makes graph journal writes fail, when built with
    /// [`TestEngine::faulty`].
    pub fault: Option<FaultSwitch>,
    _temp_dir: Option<TempDir>,
}

impl TestEngine {
    /// An engine over an in-memory store and an in-memory graph.
    pub fn memory() -> Self {
        Self::memory_with(&[])
    }

    /// Like [`memory`](Self::memory), pre-filled with `documents`.
    pub fn memory_with(documents: &[(&str, &str)]) -> Self {
        let engine = Engine::open(Config::default(), Arc::new(memory_store(documents)))
            .expect("Failed to open in-memory engine");
        Self {
            engine,
            fault: None,
            _temp_dir: None,
        }
    }

    /// An engine with no graph store at all.
    pub fn without_graph(documents: &[(&str, &str)]) -> Self {
        let engine = Engine::open(
            Config::default().without_graph(),
            Arc::new(memory_store(documents)),
        )
        .expect("Failed to open engine");
        Self {
            engine,
            fault: None,
            _temp_dir: None,
        }
    }

    /// An engine whose graph journal fails writes while the returned switch
    /// is on.
    pub fn faulty(documents: &[(&str, &str)]) -> Self {
        let (backend, switch) = FaultyBackend::new(InMemoryBackend::new());
        let client = GraphClient::with_backend(Box::new(backend), GraphConfig::in_memory())
            .expect("Failed to open graph");
        let engine = Engine::with_graph(
            Config::default(),
            Arc::new(memory_store(documents)),
            Some(Arc::new(client)),
        );
        Self {
            engine,
            fault: Some(switch),
            _temp_dir: None,
        }
    }

    /// An engine over a JSON directory and a directory graph store, both in
    /// a fresh temp dir.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let engine = open_file_engine(temp_dir.path());
        Self {
            engine,
            fault: None,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Root of the temp dir, if file-based.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().to_path_buf())
    }

    /// Closes the engine and opens a new one over the same directories.
    ///
    /// # Panics
    ///
    /// Panics on an in-memory engine.
    pub fn reopen(self) -> Self {
        let temp_dir = self._temp_dir.expect("reopen needs a file-based engine");
        self.engine.close();
        drop(self.engine);
        let engine = open_file_engine(temp_dir.path());
        Self {
            engine,
            fault: None,
            _temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestEngine {
    type Target = Engine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

/// An in-memory store holding `documents`.
pub fn memory_store(documents: &[(&str, &str)]) -> MemoryDocumentStore {
    MemoryDocumentStore::with_documents(documents.iter().map(|(id, text)| Document::new(*id, *text)))
}

/// Paths of the document and graph directories under `root`.
pub fn file_layout(root: &Path) -> (PathBuf, PathBuf) {
    (root.join("data"), root.join("graph"))
}

fn open_file_engine(root: &Path) -> Engine {
    let (data, graph) = file_layout(root);
    let store: Arc<dyn DocumentStore> =
        Arc::new(JsonDirStore::open(data).expect("Failed to open document directory"));
    Engine::open(Config::default().graph(GraphConfig::directory(graph)), store)
        .expect("Failed to open file engine")
}

/// Runs `f` with a fresh in-memory engine.
///
/// # Example
///
/// ```rust
/// use drillgraph_testkit::with_temp_engine;
///
/// with_temp_engine(|engine| {
///     assert!(engine.cross_links().unwrap().is_empty());
/// });
/// ```
pub fn with_temp_engine<F, R>(f: F) -> R
where
    F: FnOnce(&Engine) -> R,
{
    let test_engine = TestEngine::memory();
    f(&test_engine.engine)
}

/// Runs `f` with a fresh file-backed engine and its temp root.
pub fn with_file_engine<F, R>(f: F) -> R
where
    F: FnOnce(&Engine, &Path) -> R,
{
    let test_engine = TestEngine::file();
    let path = test_engine.path().expect("File engine should have a path");
    f(&test_engine.engine, &path)
}

/// Metadata map for fixtures.
pub fn sample_metadata() -> drillgraph_core::Metadata {
    match serde_json::json!({ "source": "testkit", "tags": ["fixture"] }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!("literal is an object"),
    }
}
