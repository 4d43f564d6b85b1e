//! Source locations
//!
//!     Every token carries a [`Span`]: the file it came from plus a start and end
//!     position, both 1-based. A single raw character at `(line, col)` covers
//!     `(line, col)-(line, col + 1)`, so the end position is exclusive.
//!
//!     Spans grow by merging. The lexer merges the spans of the raw characters a
//!     keyword or identifier is built from, and diagnostics report the merged
//!     range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// File name used when the caller does not supply one.
pub const UNKNOWN_FILE: &str = "<unknown>";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: Arc<str>,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(
        file: Arc<str>,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
    ) -> Self {
        Self {
            file,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Span of the single character at `(line, col)`.
    pub fn point(file: Arc<str>, line: u32, col: u32) -> Self {
        Self::new(file, line, col, line, col + 1)
    }

    /// Smallest span covering both `self` and `other`. The file is taken from `self`.
    pub fn merge(&self, other: &Span) -> Span {
        let (start_line, start_col) = match self.start_line.cmp(&other.start_line) {
            std::cmp::Ordering::Less => (self.start_line, self.start_col),
            std::cmp::Ordering::Greater => (other.start_line, other.start_col),
            std::cmp::Ordering::Equal => (self.start_line, self.start_col.min(other.start_col)),
        };
        let (end_line, end_col) = match self.end_line.cmp(&other.end_line) {
            std::cmp::Ordering::Greater => (self.end_line, self.end_col),
            std::cmp::Ordering::Less => (other.end_line, other.end_col),
            std::cmp::Ordering::Equal => (self.end_line, self.end_col.max(other.end_col)),
        };

        Span {
            file: self.file.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::point(Arc::from(UNKNOWN_FILE), 0, 0)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start_line, self.start_col)
    }
}
