//! Property-based test generators using proptest.
//!
//! Strategies produce text that the default delimiters split cleanly, so
//! properties can reason about line and word counts.

use drillgraph_core::{Address, Edit, Mutation};
use proptest::prelude::*;

/// A small vocabulary so that generated documents actually share words.
pub const VOCABULARY: [&str; 12] = [
    "the", "cat", "dog", "sat", "ran", "fast", "mat", "sun", "Red", "blue", "CAT", "é",
];

/// Strategy for one word, drawn from [`VOCABULARY`] or random lowercase.
pub fn word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(&VOCABULARY[..]).prop_map(str::to_string),
        1 => prop::string::string_regex("[a-z]{1,6}").expect("Invalid regex"),
    ]
}

/// Strategy for one line of 1..=6 space-separated words.
pub fn line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..=6).prop_map(|words| words.join(" "))
}

/// Strategy for document text of 1..=4 lines.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 1..=4).prop_map(|lines| lines.join("\n"))
}

/// Strategy for text that may contain blank lines and doubled spaces.
pub fn messy_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-c \n]{0,40}").expect("Invalid regex")
}

/// Strategy for a valid document id.
pub fn document_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,11}").expect("Invalid regex")
}

/// Strategy for a corpus of 1..=`max_docs` documents with distinct ids
/// `doc0`, `doc1`, ...
pub fn corpus_strategy(max_docs: usize) -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(text_strategy(), 1..=max_docs.max(1)).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| (format!("doc{i}"), text))
            .collect()
    })
}

/// Strategy for an edit whose positions may be out of range.
pub fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..8, word_strategy()).prop_map(|(position, value)| Edit::Insert { position, value }),
        (0usize..8).prop_map(|position| Edit::Delete { position }),
        (0usize..8, 0usize..8).prop_map(|(from, to)| Edit::Reorder { from, to }),
    ]
}

/// Strategy for a mutation at any level with small indices.
pub fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    let address = prop_oneof![
        Just(Address::lines()),
        (0usize..4).prop_map(Address::words),
        (0usize..4, 0usize..6).prop_map(|(l, w)| Address::chars(l, w)),
    ];
    (address, edit_strategy()).prop_map(|(address, edit)| Mutation::new(address, edit))
}

/// Borrowed view of a generated corpus, in the shape fixtures take.
pub fn as_pairs(corpus: &[(String, String)]) -> Vec<(&str, &str)> {
    corpus
        .iter()
        .map(|(id, text)| (id.as_str(), text.as_str()))
        .collect()
}
