//! Where tokens sit in the source.
//!
//! The tokenizer walks the input with an empty cursor span, widening it over
//! each match and then moving it past the match with [`Span::after`].

use std::fmt;

/// A byte range plus the line and column it starts at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// The empty span at 1:1.
    #[must_use]
    pub const fn at_start() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Widens this span over `text`, which must start at `self.start`.
    #[must_use]
    pub fn covering(self, text: &str) -> Self {
        Self {
            end: self.start + text.len(),
            ..self
        }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a zero-width span.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The slice of `source` this span covers.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Returns the empty span just past `text`, assuming `text` starts at
    /// this span's start.
    #[must_use]
    pub fn after(&self, text: &str) -> Self {
        let end = self.start + text.len();
        match text.rfind('\n') {
            Some(newline) => {
                let lines = u32::try_from(text.matches('\n').count()).unwrap_or(u32::MAX);
                let column = u32::try_from(text[newline + 1..].chars().count()).unwrap_or(u32::MAX);
                Self::new(end, end, self.line.saturating_add(lines), column.saturating_add(1))
            }
            None => {
                let width = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                Self::new(end, end, self.line, self.column.saturating_add(width))
            }
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
