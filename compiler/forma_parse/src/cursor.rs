//! Immutable source cursor.
//!
//! A [`ParseContext`] is a shared source string plus a byte offset. Every
//! consuming operation returns a new cursor, so a parser that fails can hand
//! back the cursor it was given and backtracking is free.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use forma_ir::{Origin, ANONYMOUS_SOURCE};

/// Position in a source string.
///
/// Invariant: `index <= source.len()` and `index` lies on a char boundary.
/// Equality and hashing use the source text and the index; the source id is
/// only carried along for diagnostics.
#[derive(Clone)]
pub struct ParseContext {
    source: Arc<str>,
    source_id: Arc<str>,
    /// Byte offset of every line start, computed once per source.
    line_starts: Arc<[usize]>,
    index: usize,
}

impl ParseContext {
    /// Cursor at the start of `source`.
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let source: Arc<str> = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        ParseContext {
            source,
            source_id: ANONYMOUS_SOURCE.into(),
            line_starts,
            index: 0,
        }
    }

    /// Name the source for origins (usually a file path).
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<Arc<str>>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Same source, different position.
    ///
    /// Out-of-range indices clamp to the end; indices inside a multi-byte
    /// character move back to its start.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        let mut index = index.min(self.source.len());
        while !self.source.is_char_boundary(index) {
            index -= 1;
        }
        ParseContext {
            source: Arc::clone(&self.source),
            source_id: Arc::clone(&self.source_id),
            line_starts: Arc::clone(&self.line_starts),
            index,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Byte offset into the source.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Unconsumed input.
    #[inline]
    pub fn remaining(&self) -> &str {
        &self.source[self.index..]
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        self.index == self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The next `n` characters (fewer at end of input).
    pub fn peek_chars(&self, n: usize) -> &str {
        let rest = self.remaining();
        let end = rest.char_indices().nth(n).map_or(rest.len(), |(i, _)| i);
        &rest[..end]
    }

    /// Cursor advanced by `n` characters (stops at end of input).
    #[must_use]
    pub fn consume(&self, n: usize) -> Self {
        let len = self.peek_chars(n).len();
        self.with_index(self.index + len)
    }

    /// Cursor advanced past `text`, which the caller has matched already.
    #[must_use]
    pub(crate) fn consume_str(&self, text: &str) -> Self {
        self.with_index(self.index + text.len())
    }

    /// Source between `start` and this cursor.
    ///
    /// Empty if `start` is not behind this cursor.
    pub fn consumed_since(&self, start: &ParseContext) -> &str {
        if start.index <= self.index {
            &self.source[start.index..self.index]
        } else {
            ""
        }
    }

    /// 1-based line and column (in characters) of this position.
    pub fn line_column(&self) -> (u32, u32) {
        // `line_starts[0] == 0`, so at least one start is at or before `index`.
        let line = self.line_starts.partition_point(|&start| start <= self.index);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..self.index].chars().count() + 1;
        (saturate(line), saturate(column))
    }

    /// Origin for an expression node starting here.
    pub fn origin(&self) -> Origin {
        let (line, column) = self.line_column();
        Origin::new(line, column, Arc::clone(&self.source_id))
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl PartialEq for ParseContext {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && (Arc::ptr_eq(&self.source, &other.source) || self.source == other.source)
    }
}

impl Eq for ParseContext {}

impl Hash for ParseContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.line_column();
        write!(
            f,
            "ParseContext({}:{line}:{column}, {:?})",
            self.source_id,
            self.peek_chars(12)
        )
    }
}
