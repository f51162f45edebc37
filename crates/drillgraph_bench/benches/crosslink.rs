//! Cross-link index benchmarks: graph traversal against document scan.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drillgraph_bench::{records, synthetic_corpus};
use drillgraph_core::{
    CrossLinkIndex, Delimiters, Diagnostics, DocumentStore, FallbackCrossLinkIndex, GraphClient,
    GraphCrossLinkIndex, MemoryDocumentStore, StaleTracker,
};
use std::sync::Arc;

fn indexes(count: usize) -> (GraphCrossLinkIndex, FallbackCrossLinkIndex) {
    let corpus = synthetic_corpus(count, 10, 8);
    let client = Arc::new(GraphClient::in_memory().unwrap());
    for record in records(&corpus) {
        client.upsert_document(&record).unwrap();
    }
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::with_documents(corpus));
    let graph = GraphCrossLinkIndex::new(
        client,
        FallbackCrossLinkIndex::new(Arc::clone(&store), Delimiters::default()),
        Arc::new(Diagnostics::new()),
        Arc::new(StaleTracker::new()),
    );
    (graph, FallbackCrossLinkIndex::new(store, Delimiters::default()))
}

/// Benchmark `find_common_words` on both backends.
fn bench_common_words(c: &mut Criterion) {
    let mut group = c.benchmark_group("common_words");
    group.sample_size(20);

    for count in [10, 100, 500] {
        let (graph, fallback) = indexes(count);
        group.bench_with_input(BenchmarkId::new("graph", count), &count, |b, _| {
            b.iter(|| black_box(graph.find_common_words().unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("fallback", count), &count, |b, _| {
            b.iter(|| black_box(fallback.find_common_words().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark traversal of one word, corpus-wide and within one document.
fn bench_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("traverse");
    let (graph, fallback) = indexes(200);

    group.bench_function("graph_all", |b| {
        b.iter(|| black_box(graph.traverse_word_parents("delta", None).unwrap()));
    });
    group.bench_function("graph_one_document", |b| {
        b.iter(|| black_box(graph.traverse_word_parents("delta", Some("doc0100")).unwrap()));
    });
    group.bench_function("fallback_all", |b| {
        b.iter(|| black_box(fallback.traverse_word_parents("delta", None).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_common_words, bench_traverse);
criterion_main!(benches);
