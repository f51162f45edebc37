//! Benchmark utilities.
//!
//! Corpora are generated deterministically so runs are comparable.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use drillgraph_core::{derive_record, Delimiters, Document};
use drillgraph_graph::DocumentRecord;

const WORDS: [&str; 16] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa",
];

/// Text of `lines` lines with `words` words each, varied by `seed`.
pub fn synthetic_text(seed: usize, lines: usize, words: usize) -> String {
    (0..lines)
        .map(|l| {
            (0..words)
                .map(|w| WORDS[(seed * 7 + l * 3 + w * 5) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `count` documents `doc0000`, `doc0001`, ... of synthetic text.
pub fn synthetic_corpus(count: usize, lines: usize, words: usize) -> Vec<Document> {
    (0..count)
        .map(|i| Document::new(format!("doc{i:04}"), synthetic_text(i, lines, words)))
        .collect()
}

/// Index records of a corpus with default delimiters.
pub fn records(corpus: &[Document]) -> Vec<DocumentRecord> {
    let delimiters = Delimiters::default();
    corpus
        .iter()
        .map(|doc| derive_record(&doc.id, &doc.text, &delimiters))
        .collect()
}
