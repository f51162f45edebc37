//! Graph store failures never surface from indexing or cross-link queries.

use drillgraph_core::{
    Address, Config, CoreError, CrossLinkEntry, CrossLinkIndex, Delimiters, DocumentStore, Edit,
    Engine, GraphClient, GraphConfig, IndexBackend, Mutation, RebuildStatus, SyncStatus,
};
use drillgraph_testkit::prelude::*;
use std::sync::Arc;

#[test]
fn closed_graph_answers_from_documents() {
    let engine = TestEngine::memory_with(&SAMPLE_CORPUS);
    engine.graph().unwrap().close();

    let words: Vec<_> = engine
        .cross_links()
        .unwrap()
        .into_iter()
        .map(|e| e.word)
        .collect();
    assert_eq!(words, vec!["cat", "ran", "the"]);

    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Fallback);
    assert!(!status.graph_available);
    assert_eq!(status.diagnostics.graph_failures, 1);
    assert_eq!(status.diagnostics.fallback_answers, 1);
    assert!(status.diagnostics.last_error.is_some());
}

#[test]
fn writes_succeed_while_graph_is_closed() {
    let engine = TestEngine::memory_with(&SAMPLE_CORPUS);
    engine.graph().unwrap().close();

    let result = engine
        .mutate(
            "B",
            &Mutation::new(
                Address::words(0),
                Edit::Insert {
                    position: 0,
                    value: "dog".into(),
                },
            ),
        )
        .unwrap();
    assert_eq!(result.index, Some(SyncStatus::Skipped));
    assert_eq!(engine.status().unwrap().diagnostics.skipped_syncs, 1);

    let links = engine.cross_links().unwrap();
    assert!(links.iter().any(|e| e.word == "dog"));
}

/// What the scanning index says about the engine's current documents.
fn links_from_documents(engine: &Engine) -> Vec<CrossLinkEntry> {
    let documents: Vec<(String, String)> = engine
        .store()
        .list()
        .unwrap()
        .into_iter()
        .map(|d| (d.id, d.text))
        .collect();
    IndexPair::build(&as_pairs(&documents), &Delimiters::default())
        .unwrap()
        .fallback
        .find_common_words()
        .unwrap()
}

#[test]
fn failed_reindex_is_not_served_from_graph() {
    let engine = TestEngine::faulty(&[("A", "the cat\nred dog"), ("B", "dog")]);
    let fault = engine.fault.clone().unwrap();
    assert_eq!(engine.cross_links().unwrap()[0].word, "dog");

    fault.set_failing(true);
    let result = engine
        .mutate("A", &Mutation::new(Address::lines(), Edit::Delete { position: 1 }))
        .unwrap();
    assert_eq!(result.text, "the cat");
    assert_eq!(result.index, Some(SyncStatus::Skipped));
    fault.set_failing(false);

    // The graph still holds the deleted line.
    assert_eq!(engine.graph().unwrap().word_parents("dog", Some("A")).unwrap().len(), 1);
    let links = engine.cross_links().unwrap();
    assert!(links.is_empty());
    assert_eq!(links, links_from_documents(&engine));
    assert!(matches!(
        engine.traverse("dog", Some("A")),
        Err(CoreError::WordNotFound { .. })
    ));
    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Fallback);
    assert_eq!(status.stale_documents, vec!["A"]);

    // The next successful write of A brings the graph back in use.
    engine
        .mutate(
            "A",
            &Mutation::new(
                Address::words(0),
                Edit::Insert {
                    position: 9,
                    value: "too".into(),
                },
            ),
        )
        .unwrap();
    assert_eq!(engine.cross_links().unwrap(), links_from_documents(&engine));
    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Graph);
    assert!(status.stale_documents.is_empty());
}

#[test]
fn failed_journal_write_skips_sync_and_rebuild_recovers() {
    let engine = TestEngine::faulty(&SAMPLE_CORPUS);
    let fault = engine.fault.clone().unwrap();

    fault.set_failing(true);
    let doc = engine
        .create_document("C", "fast dog", Default::default())
        .unwrap();
    assert_eq!(doc.text, "fast dog");
    assert_eq!(engine.status().unwrap().diagnostics.skipped_syncs, 1);

    // C is missing from the graph, so answers come from the documents.
    let links = engine.cross_links().unwrap();
    assert!(links.iter().any(|e| e.word == "dog"));
    assert_eq!(links, links_from_documents(&engine));
    assert_eq!(engine.status().unwrap().backend, IndexBackend::Fallback);

    // The wipe cannot truncate the journal, so nothing is touched.
    assert!(matches!(
        engine.rebuild_index().unwrap().status,
        RebuildStatus::Skipped { .. }
    ));
    assert_eq!(engine.status().unwrap().stale_documents, vec!["C"]);

    fault.set_failing(false);
    let report = engine.rebuild_index().unwrap();
    assert_eq!(report.status, RebuildStatus::Rebuilt);
    assert_eq!(report.indexed, 3);

    let links = engine.cross_links().unwrap();
    assert!(links.iter().any(|e| e.word == "dog"));
    assert!(links.iter().any(|e| e.word == "fast"));
    assert_eq!(links, links_from_documents(&engine));
    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Graph);
    assert!(status.stale_documents.is_empty());
}

#[test]
fn partial_rebuild_answers_from_documents() {
    // Frames this small fit a two-word document but not the long one.
    let client = GraphClient::connect(&GraphConfig::in_memory().max_frame_bytes(256)).unwrap();
    let long = format!("{}shared", "word ".repeat(200));
    let engine = Engine::with_graph(
        Config::default(),
        Arc::new(memory_store(&[("big", long.as_str()), ("small", "shared word")])),
        Some(Arc::new(client)),
    );

    let report = engine.rebuild_index().unwrap();
    assert_eq!(report.status, RebuildStatus::Rebuilt);
    assert_eq!(report.indexed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(engine.graph().unwrap().document_ids().unwrap(), vec!["small"]);

    let words: Vec<_> = engine
        .cross_links()
        .unwrap()
        .into_iter()
        .map(|e| e.word)
        .collect();
    assert_eq!(words, vec!["shared", "word"]);
    assert_eq!(engine.traverse("shared", Some("big")).unwrap().len(), 1);
    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Fallback);
    assert_eq!(status.stale_documents, vec!["big"]);
}

#[test]
fn no_graph_configured() {
    let engine = TestEngine::without_graph(&SAMPLE_CORPUS);
    assert!(engine.graph().is_none());
    assert_eq!(engine.cross_links().unwrap().len(), 3);
    assert_eq!(engine.traverse("THE", Some("A")).unwrap().len(), 2);

    let status = engine.status().unwrap();
    assert_eq!(status.backend, IndexBackend::Fallback);
    assert!(status.graph.is_none());
    assert!(engine.compact_graph().is_err());
}
