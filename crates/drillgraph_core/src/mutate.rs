//! Structural edits on decomposed text.
//!
//! The text-level primitives ([`insert_at`], [`delete_at`], [`reorder`])
//! work on one segment list. [`apply_mutation`] addresses a segment list
//! anywhere in the paragraph → line → word → char hierarchy, edits it and
//! reassembles the paragraph bottom-up.
//!
//! All edits go through [`split`], so their output is canonical: empty
//! segments are gone and runs of delimiters are collapsed.

use crate::decompose::{join, split, Delimiters};
use crate::error::{CoreError, CoreResult};
use crate::level::Level;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn segments(text: &str, delimiter: &str) -> Vec<String> {
    // `Chars` only matters for the empty delimiter, where it splits per char.
    split(text, delimiter, Level::Chars)
}

/// Inserts `value` at `position`, clamped into `[0, len]`.
///
/// ```rust
/// use drillgraph_core::insert_at;
///
/// assert_eq!(insert_at("the cat", " ", 1, "new"), "the new cat");
/// assert_eq!(insert_at("a b", " ", 99, "c"), "a b c");
/// ```
#[must_use]
pub fn insert_at(text: &str, delimiter: &str, position: usize, value: &str) -> String {
    let mut parts = segments(text, delimiter);
    let position = position.min(parts.len());
    parts.insert(position, value.to_string());
    join(&parts, delimiter)
}

/// Removes the segment at `position`. Out of range returns `text` unchanged.
#[must_use]
pub fn delete_at(text: &str, delimiter: &str, position: usize) -> String {
    let mut parts = segments(text, delimiter);
    if position >= parts.len() {
        return text.to_string();
    }
    parts.remove(position);
    join(&parts, delimiter)
}

/// Moves the segment at `from` to `to` (an index into the shortened list).
/// Returns `text` unchanged unless both indices are in range.
#[must_use]
pub fn reorder(text: &str, delimiter: &str, from: usize, to: usize) -> String {
    let mut parts = segments(text, delimiter);
    if from >= parts.len() || to >= parts.len() {
        return text.to_string();
    }
    let item = parts.remove(from);
    parts.insert(to, item);
    join(&parts, delimiter)
}

/// Which segment list an edit applies to.
///
/// Parent indices are never inferred: a level-2 address needs `line`, a
/// level-3 address needs `line` and `word`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Level of the edited segments.
    pub level: Level,
    /// Parent line, for levels 2 and 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Parent word, for level 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<usize>,
}

impl Address {
    /// The document's lines.
    #[must_use]
    pub const fn lines() -> Self {
        Self {
            level: Level::Lines,
            line: None,
            word: None,
        }
    }

    /// The words of one line.
    #[must_use]
    pub const fn words(line: usize) -> Self {
        Self {
            level: Level::Words,
            line: Some(line),
            word: None,
        }
    }

    /// The characters of one word.
    #[must_use]
    pub const fn chars(line: usize, word: usize) -> Self {
        Self {
            level: Level::Chars,
            line: Some(line),
            word: Some(word),
        }
    }
}

/// An edit on one segment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Edit {
    /// Insert a segment; the position is clamped.
    Insert {
        /// Target position.
        position: usize,
        /// New segment. Must not be empty.
        value: String,
    },
    /// Remove a segment; out of range is a no-op.
    Delete {
        /// Position to remove.
        position: usize,
    },
    /// Move a segment; both indices must be in range.
    Reorder {
        /// Current position.
        from: usize,
        /// Position in the list after removal.
        to: usize,
    },
}

impl Edit {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
        }
    }

    /// Applies the edit in place. Returns whether the list was touched.
    fn apply(&self, parts: &mut Vec<String>) -> CoreResult<bool> {
        match self {
            Self::Insert { position, value } => {
                if value.is_empty() {
                    return Err(CoreError::invalid_operation("cannot insert an empty value"));
                }
                let position = (*position).min(parts.len());
                parts.insert(position, value.clone());
                Ok(true)
            }
            Self::Delete { position } => {
                if *position >= parts.len() {
                    return Ok(false);
                }
                parts.remove(*position);
                Ok(true)
            }
            Self::Reorder { from, to } => {
                for index in [*from, *to] {
                    if index >= parts.len() {
                        return Err(CoreError::out_of_range("position", index, parts.len()));
                    }
                }
                let item = parts.remove(*from);
                parts.insert(*to, item);
                Ok(true)
            }
        }
    }
}

/// An addressed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Target segment list.
    pub address: Address,
    /// What to do with it.
    pub edit: Edit,
}

impl Mutation {
    /// Creates a mutation.
    #[must_use]
    pub fn new(address: Address, edit: Edit) -> Self {
        Self { address, edit }
    }
}

/// Result of [`apply_mutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The reassembled paragraph.
    pub text: String,
    /// `false` when the edit was a no-op (delete out of range) and `text`
    /// is the input unchanged.
    pub applied: bool,
}

/// Applies `mutation` to `text`.
///
/// After a level-3 delete a word left without characters is removed from
/// its line, and after a level-2 or level-3 delete a line left without
/// words is removed from the paragraph.
///
/// # Errors
///
/// - [`CoreError::InvalidAddress`] if a required parent index is missing
/// - [`CoreError::OutOfRange`] if a parent index or a reorder index is out
///   of range
/// - [`CoreError::InvalidOperation`] when inserting an empty value
pub fn apply_mutation(
    text: &str,
    delimiters: &Delimiters,
    mutation: &Mutation,
) -> CoreResult<MutationOutcome> {
    let Mutation { address, edit } = mutation;
    let mut lines = split(text, &delimiters.line, Level::Lines);

    let applied = match address.level {
        Level::Lines => edit.apply(&mut lines)?,
        Level::Words => {
            let li = require(address.line, "line", Level::Words)?;
            let line = lines
                .get(li)
                .ok_or_else(|| CoreError::out_of_range("line", li, lines.len()))?;
            let mut words = split(line, &delimiters.word, Level::Words);
            let applied = edit.apply(&mut words)?;
            if applied {
                set_or_remove(&mut lines, li, join(&words, &delimiters.word));
            }
            applied
        }
        Level::Chars => {
            let li = require(address.line, "line", Level::Chars)?;
            let wi = require(address.word, "word", Level::Chars)?;
            let line = lines
                .get(li)
                .ok_or_else(|| CoreError::out_of_range("line", li, lines.len()))?;
            let mut words = split(line, &delimiters.word, Level::Words);
            let word = words
                .get(wi)
                .ok_or_else(|| CoreError::out_of_range("word", wi, words.len()))?;
            let mut chars = split(word, &delimiters.char, Level::Chars);
            let applied = edit.apply(&mut chars)?;
            if applied {
                set_or_remove(&mut words, wi, join(&chars, &delimiters.char));
                set_or_remove(&mut lines, li, join(&words, &delimiters.word));
            }
            applied
        }
    };

    if !applied {
        debug!(level = %address.level, op = edit.name(), "mutation was a no-op");
        return Ok(MutationOutcome {
            text: text.to_string(),
            applied: false,
        });
    }
    Ok(MutationOutcome {
        text: join(&lines, &delimiters.line),
        applied: true,
    })
}

fn require(index: Option<usize>, what: &str, level: Level) -> CoreResult<usize> {
    index.ok_or_else(|| CoreError::invalid_address(format!("level {level} requires a {what} index")))
}

/// Replaces `parts[index]` with `value`, or removes it if `value` is empty.
fn set_or_remove(parts: &mut Vec<String>, index: usize, value: String) {
    if value.is_empty() {
        parts.remove(index);
    } else {
        parts[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(text: &str, address: Address, edit: Edit) -> CoreResult<MutationOutcome> {
        apply_mutation(text, &Delimiters::default(), &Mutation::new(address, edit))
    }

    fn insert(position: usize, value: &str) -> Edit {
        Edit::Insert {
            position,
            value: value.to_string(),
        }
    }

    #[test]
    fn primitives() {
        assert_eq!(insert_at("a b", " ", 0, "z"), "z a b");
        assert_eq!(delete_at("a b c", " ", 1), "a c");
        assert_eq!(delete_at("a  b", " ", 5), "a  b");
        assert_eq!(reorder("a b c", " ", 0, 2), "b c a");
        assert_eq!(reorder("a b c", " ", 0, 3), "a b c");
        assert_eq!(insert_at("ac", "", 1, "b"), "abc");
    }

    #[test]
    fn insert_word_into_line() {
        let out = run("the cat", Address::words(0), insert(1, "new")).unwrap();
        assert_eq!(out.text, "the new cat");
        assert!(out.applied);
    }

    #[test]
    fn insert_line_is_clamped() {
        let out = run("one\ntwo", Address::lines(), insert(10, "three")).unwrap();
        assert_eq!(out.text, "one\ntwo\nthree");
    }

    #[test]
    fn insert_empty_value_is_rejected() {
        let err = run("a", Address::lines(), insert(0, "")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOperation { .. }));
    }

    #[test]
    fn insert_char() {
        let out = run("the ct\nx", Address::chars(0, 1), insert(1, "a")).unwrap();
        assert_eq!(out.text, "the cat\nx");
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let out = run("a  b\n\nc", Address::words(0), Edit::Delete { position: 9 }).unwrap();
        assert!(!out.applied);
        assert_eq!(out.text, "a  b\n\nc");
    }

    #[test]
    fn deleting_last_char_removes_word() {
        let out = run("a b\nc", Address::chars(0, 0), Edit::Delete { position: 0 }).unwrap();
        assert_eq!(out.text, "b\nc");
    }

    #[test]
    fn deleting_last_char_of_last_word_removes_line() {
        let out = run("a\nb c", Address::chars(0, 0), Edit::Delete { position: 0 }).unwrap();
        assert_eq!(out.text, "b c");
    }

    #[test]
    fn deleting_last_word_removes_line() {
        let out = run("x\ny\nz", Address::words(1), Edit::Delete { position: 0 }).unwrap();
        assert_eq!(out.text, "x\nz");
    }

    #[test]
    fn reorder_lines_and_words() {
        let out = run("1\n2\n3", Address::lines(), Edit::Reorder { from: 2, to: 0 }).unwrap();
        assert_eq!(out.text, "3\n1\n2");
        let out = run("a b c", Address::words(0), Edit::Reorder { from: 0, to: 1 }).unwrap();
        assert_eq!(out.text, "b a c");
    }

    #[test]
    fn reorder_out_of_range_is_an_error() {
        let err = run("a b", Address::words(0), Edit::Reorder { from: 0, to: 2 }).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OutOfRange {
                what: "position",
                index: 2,
                len: 2
            }
        ));
    }

    #[test]
    fn parent_out_of_range_is_an_error_for_every_edit() {
        for edit in [
            insert(0, "x"),
            Edit::Delete { position: 0 },
            Edit::Reorder { from: 0, to: 0 },
        ] {
            let err = run("a b", Address::words(3), edit.clone()).unwrap_err();
            assert!(matches!(err, CoreError::OutOfRange { what: "line", .. }));
            let err = run("a b", Address::chars(0, 5), edit).unwrap_err();
            assert!(matches!(err, CoreError::OutOfRange { what: "word", .. }));
        }
    }

    #[test]
    fn missing_parent_index_is_invalid_address() {
        let address = Address {
            level: Level::Chars,
            line: Some(0),
            word: None,
        };
        let err = run("a", address, Edit::Delete { position: 0 }).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress { .. }));

        let address = Address {
            level: Level::Words,
            line: None,
            word: None,
        };
        let err = run("a", address, Edit::Delete { position: 0 }).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAddress { .. }));
    }

    #[test]
    fn output_is_canonical() {
        let out = run("\n\na   b\n\n", Address::words(0), insert(2, "c")).unwrap();
        assert_eq!(out.text, "a b c");
    }

    #[test]
    fn mutation_json_shape() {
        let m: Mutation = serde_json::from_str(
            r#"{"address":{"level":2,"line":0},"edit":{"op":"insert","position":1,"value":"x"}}"#,
        )
        .unwrap();
        assert_eq!(m.address, Address::words(0));
        assert_eq!(m.edit, insert(1, "x"));
    }

    proptest! {
        #[test]
        fn insert_then_delete_restores_canonical_text(
            words in prop::collection::vec("[a-z]{1,5}", 0..8),
            position in 0usize..10,
            value in "[a-z]{1,5}",
        ) {
            let text = words.join(" ");
            let inserted = insert_at(&text, " ", position, &value);
            let at = position.min(words.len());
            prop_assert_eq!(delete_at(&inserted, " ", at), text);
        }

        #[test]
        fn reorder_in_place_is_identity(
            words in prop::collection::vec("[a-z]{1,5}", 1..8),
            i in 0usize..8,
        ) {
            let text = words.join(" ");
            let i = i % words.len();
            prop_assert_eq!(reorder(&text, " ", i, i), text);
        }

        #[test]
        fn delete_out_of_range_returns_input(text in "[a-z \\n]{0,30}", extra in 0usize..5) {
            let len = split(&text, " ", Level::Words).len();
            prop_assert_eq!(delete_at(&text, " ", len + extra), text);
        }
    }
}
