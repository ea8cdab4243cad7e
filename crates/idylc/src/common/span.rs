//! Source locations

use std::fmt;

/// A region of source text.
///
/// `start`/`end` are byte offsets (used by the diagnostic renderer), `line`
/// and `column` are the 1-based character position of `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span covering both `self` and `other`, positioned at the earlier one.
    pub fn merge(self, other: Span) -> Span {
        let first = if other.start < self.start { other } else { self };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of one source text to line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-based (line, column) of a byte offset; columns count characters.
    pub fn location(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = source
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        (line as u32 + 1, column as u32 + 1)
    }

    /// Build a span for the byte range `start..end`.
    pub fn span(&self, source: &str, start: usize, end: usize) -> Span {
        let (line, column) = self.location(source, start);
        Span::new(start, end, line, column)
    }
}
