//! Cross-link index computed by scanning the document store.

use super::derive::{derive_record, normalize_word};
use super::{CrossLinkEntry, CrossLinkIndex, IndexBackend, ParentTrace, WordOccurrence};
use crate::decompose::Delimiters;
use crate::error::CoreResult;
use crate::store::{Document, DocumentStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Inverted index rebuilt from the documents on every query.
pub struct FallbackCrossLinkIndex {
    store: Arc<dyn DocumentStore>,
    delimiters: Delimiters,
}

impl std::fmt::Debug for FallbackCrossLinkIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCrossLinkIndex")
            .field("delimiters", &self.delimiters)
            .finish_non_exhaustive()
    }
}

impl FallbackCrossLinkIndex {
    /// Creates an index over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, delimiters: Delimiters) -> Self {
        Self { store, delimiters }
    }

    fn documents(&self) -> CoreResult<Vec<Document>> {
        let mut documents = self.store.list()?;
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}

impl CrossLinkIndex for FallbackCrossLinkIndex {
    fn find_common_words(&self) -> CoreResult<Vec<CrossLinkEntry>> {
        let mut postings: BTreeMap<String, (BTreeSet<String>, Vec<WordOccurrence>)> =
            BTreeMap::new();

        // Documents are visited in id order, so postings come out ordered
        // by (document, line, word).
        for doc in self.documents()? {
            let record = derive_record(&doc.id, &doc.text, &self.delimiters);
            for (line_index, line) in record.lines.into_iter().enumerate() {
                for (word_index, word) in line.words.into_iter().enumerate() {
                    let (documents, occurrences) =
                        postings.entry(word.normalized.clone()).or_default();
                    documents.insert(doc.id.clone());
                    occurrences.push(WordOccurrence {
                        word: word.normalized,
                        document_id: doc.id.clone(),
                        line_index,
                        line_text: line.text.clone(),
                        word_index,
                        raw: word.raw,
                    });
                }
            }
        }

        let mut entries: Vec<CrossLinkEntry> = postings
            .into_iter()
            .filter(|(_, (documents, _))| documents.len() >= 2)
            .map(|(word, (documents, occurrences))| CrossLinkEntry {
                word,
                documents: documents.into_iter().collect(),
                occurrences,
            })
            .collect();
        // Stable sort keeps the BTreeMap's ascending word order within ties.
        entries.sort_by(|a, b| b.documents.len().cmp(&a.documents.len()));
        Ok(entries)
    }

    fn traverse_word_parents(
        &self,
        word: &str,
        document_id: Option<&str>,
    ) -> CoreResult<Vec<ParentTrace>> {
        let needle = normalize_word(word);
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut traces = Vec::new();
        for doc in self.documents()? {
            if document_id.is_some_and(|wanted| wanted != doc.id) {
                continue;
            }
            let record = derive_record(&doc.id, &doc.text, &self.delimiters);
            for (line_index, line) in record.lines.iter().enumerate() {
                for (word_index, w) in line.words.iter().enumerate() {
                    if w.normalized == needle {
                        traces.push(ParentTrace {
                            document_id: doc.id.clone(),
                            line_index,
                            line_text: line.text.clone(),
                            paragraph_text: doc.text.clone(),
                            word_index,
                            raw: w.raw.clone(),
                        });
                    }
                }
            }
        }
        Ok(traces)
    }

    fn backend(&self) -> IndexBackend {
        IndexBackend::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    fn index(docs: &[(&str, &str)]) -> FallbackCrossLinkIndex {
        let store = MemoryDocumentStore::with_documents(
            docs.iter().map(|(id, text)| Document::new(*id, *text)),
        );
        FallbackCrossLinkIndex::new(Arc::new(store), Delimiters::default())
    }

    #[test]
    fn common_words_of_two_documents() {
        let idx = index(&[("A", "the cat sat\nthe dog ran"), ("B", "the cat ran fast")]);
        let entries = idx.find_common_words().unwrap();
        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "ran", "the"]);
        assert!(entries.iter().all(|e| e.documents == vec!["A", "B"]));

        let the = &entries[2];
        let positions: Vec<(&str, usize, usize)> = the
            .occurrences
            .iter()
            .map(|o| (o.document_id.as_str(), o.line_index, o.word_index))
            .collect();
        assert_eq!(positions, vec![("A", 0, 0), ("A", 1, 0), ("B", 0, 0)]);
    }

    #[test]
    fn more_documents_rank_first() {
        let idx = index(&[("a", "x y"), ("b", "x y"), ("c", "y")]);
        let words: Vec<String> = idx
            .find_common_words()
            .unwrap()
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(words, vec!["y", "x"]);
    }

    #[test]
    fn case_folding_links_words() {
        let idx = index(&[("a", "Rust"), ("b", "rust")]);
        let entries = idx.find_common_words().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].occurrences[0].raw, "Rust");
    }

    #[test]
    fn word_in_one_document_is_not_common() {
        let idx = index(&[("a", "solo solo"), ("b", "other")]);
        assert!(idx.find_common_words().unwrap().is_empty());
    }

    #[test]
    fn traverse_normalizes_and_filters() {
        let idx = index(&[("A", "the cat\nThe end"), ("B", "THE")]);

        let all = idx.traverse_word_parents("  The ", None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].raw, "The");
        assert_eq!(all[1].line_index, 1);
        assert_eq!(all[1].paragraph_text, "the cat\nThe end");

        let only_b = idx.traverse_word_parents("the", Some("B")).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].document_id, "B");

        assert!(idx.traverse_word_parents("absent", None).unwrap().is_empty());
        assert!(idx.traverse_word_parents("   ", None).unwrap().is_empty());
    }
}
