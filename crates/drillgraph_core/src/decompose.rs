//! Splitting text into segments and joining them back.

use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Splits `text` into the segments of `level`.
///
/// - Empty text yields no segments.
/// - At [`Level::Chars`] an empty delimiter yields one segment per `char`.
/// - At the other levels an empty delimiter means "do not split".
/// - Otherwise the text is split on the literal delimiter and empty
///   segments are dropped.
///
/// ```rust
/// use drillgraph_core::{split, Level};
///
/// assert_eq!(split("a  b", " ", Level::Words), vec!["a", "b"]);
/// assert_eq!(split("héllo", "", Level::Chars).len(), 5);
/// ```
#[must_use]
pub fn split(text: &str, delimiter: &str, level: Level) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() {
        return match level {
            Level::Chars => text.chars().map(String::from).collect(),
            Level::Lines | Level::Words => vec![text.to_string()],
        };
    }
    text.split(delimiter)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins segments with `delimiter`. Inverse of [`split`] on its output.
#[must_use]
pub fn join<S: AsRef<str>>(segments: &[S], delimiter: &str) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(delimiter);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// The delimiters for all three levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Paragraph → lines.
    pub line: String,
    /// Line → words.
    pub word: String,
    /// Word → characters.
    pub char: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            line: Level::Lines.default_delimiter().to_string(),
            word: Level::Words.default_delimiter().to_string(),
            char: Level::Chars.default_delimiter().to_string(),
        }
    }
}

impl Delimiters {
    /// The delimiter of `level`.
    #[must_use]
    pub fn get(&self, level: Level) -> &str {
        match level {
            Level::Lines => &self.line,
            Level::Words => &self.word,
            Level::Chars => &self.char,
        }
    }

    /// Returns a copy with `level`'s delimiter replaced.
    #[must_use]
    pub fn with(mut self, level: Level, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        match level {
            Level::Lines => self.line = delimiter,
            Level::Words => self.word = delimiter,
            Level::Chars => self.char = delimiter,
        }
        self
    }
}
