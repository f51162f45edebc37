//! Turning document text into index records.

use crate::decompose::{split, Delimiters};
use crate::level::Level;
use drillgraph_graph::{DocumentRecord, LineRecord, WordRecord};

/// Join key of a word: trimmed and lowercased.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Derives the index record of one document.
///
/// Lines are the level-1 segments that are not blank, numbered
/// consecutively. Words are the level-2 segments of a line that are not
/// blank, numbered consecutively within the line.
#[must_use]
pub fn derive_record(document_id: &str, text: &str, delimiters: &Delimiters) -> DocumentRecord {
    let lines = split(text, &delimiters.line, Level::Lines)
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let words = split(&line, &delimiters.word, Level::Words)
                .into_iter()
                .filter(|w| !w.trim().is_empty())
                .map(|raw| WordRecord {
                    normalized: normalize_word(&raw),
                    raw,
                })
                .collect();
            LineRecord { text: line, words }
        })
        .collect();

    DocumentRecord {
        document_id: document_id.to_string(),
        paragraph: text.to_string(),
        lines,
    }
}
