//! Decomposition levels.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decomposition level below the paragraph.
///
/// | level | segments of | default delimiter |
/// |-------|-------------|-------------------|
/// | 1     | paragraph   | `"\n"`            |
/// | 2     | line        | `" "`             |
/// | 3     | word        | `""` (chars)      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    /// Paragraph → lines.
    Lines = 1,
    /// Line → words.
    Words = 2,
    /// Word → characters.
    Chars = 3,
}

impl Level {
    /// All levels, top to bottom.
    pub const ALL: [Level; 3] = [Level::Lines, Level::Words, Level::Chars];

    /// Numeric level, 1–3.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// The delimiter used when the caller does not supply one.
    #[must_use]
    pub const fn default_delimiter(self) -> &'static str {
        match self {
            Self::Lines => "\n",
            Self::Words => " ",
            Self::Chars => "",
        }
    }

    /// The level below, if any.
    #[must_use]
    pub const fn next(self) -> Option<Level> {
        match self {
            Self::Lines => Some(Self::Words),
            Self::Words => Some(Self::Chars),
            Self::Chars => None,
        }
    }

    /// The level above, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Level> {
        match self {
            Self::Lines => None,
            Self::Words => Some(Self::Lines),
            Self::Chars => Some(Self::Words),
        }
    }

    /// Label of the element whose children live at this level.
    #[must_use]
    pub const fn parent_label(self) -> &'static str {
        match self {
            Self::Lines => "Paragraph",
            Self::Words => "Line",
            Self::Chars => "Word",
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl TryFrom<i64> for Level {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Lines),
            2 => Ok(Self::Words),
            3 => Ok(Self::Chars),
            level => Err(CoreError::InvalidLevel { level }),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.number()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
