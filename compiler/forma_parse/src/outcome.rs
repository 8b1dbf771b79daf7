//! Parse results and failure trees.
//!
//! A [`ParseResult`] is either a value plus the cursor after it, or a
//! [`ParseFailure`]. Failures nest: each combinator that gives up wraps the
//! failure of the child that stopped it as its `cause`, so the chain ends at
//! the most specific mismatch. The tree is kept intact for diagnostics.
//!
//! ## Invariant
//!
//! A failure's `cursor` is the cursor its parser was invoked with. Causes may
//! point further into the input (that is where they failed), but no partial
//! consumption escapes through the outer failure.

use std::fmt;

use crate::cursor::ParseContext;

/// Successful parse: the value and the cursor just past it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseSuccess<T> {
    pub value: T,
    pub cursor: ParseContext,
}

/// Failed parse.
#[derive(Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Name of what the failing parser was looking for.
    pub expected: String,
    /// Failure of the sub-parser that caused this one, if any.
    pub cause: Option<Box<ParseFailure>>,
    /// Where the failing parser was invoked.
    pub cursor: ParseContext,
}

/// Outcome of running a parser.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseResult<T> {
    Success(ParseSuccess<T>),
    Failure(ParseFailure),
}

impl<T> ParseResult<T> {
    // === Constructors ===

    #[inline]
    pub fn success(value: T, cursor: ParseContext) -> Self {
        ParseResult::Success(ParseSuccess { value, cursor })
    }

    #[inline]
    pub fn failure(expected: impl Into<String>, cursor: ParseContext) -> Self {
        ParseResult::Failure(ParseFailure::new(expected, cursor))
    }

    #[inline]
    pub fn failure_with_cause(
        expected: impl Into<String>,
        cursor: ParseContext,
        cause: ParseFailure,
    ) -> Self {
        ParseResult::Failure(ParseFailure::new(expected, cursor).with_cause(cause))
    }

    // === Queries ===

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success(_))
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, ParseResult::Failure(_))
    }

    /// Cursor after a success, or the invocation cursor of a failure.
    pub fn cursor(&self) -> &ParseContext {
        match self {
            ParseResult::Success(s) => &s.cursor,
            ParseResult::Failure(f) => &f.cursor,
        }
    }

    // === Conversions ===

    /// Map the success value; failures pass through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        match self {
            ParseResult::Success(s) => ParseResult::success(f(s.value), s.cursor),
            ParseResult::Failure(e) => ParseResult::Failure(e),
        }
    }

    pub fn into_result(self) -> Result<ParseSuccess<T>, ParseFailure> {
        match self {
            ParseResult::Success(s) => Ok(s),
            ParseResult::Failure(f) => Err(f),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ParseResult::Success(s) => Some(s.value),
            ParseResult::Failure(_) => None,
        }
    }
}

impl ParseFailure {
    pub fn new(expected: impl Into<String>, cursor: ParseContext) -> Self {
        ParseFailure {
            expected: expected.into(),
            cause: None,
            cursor,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ParseFailure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Iterate from this failure down its cause chain.
    pub fn chain(&self) -> impl Iterator<Item = &ParseFailure> {
        std::iter::successors(Some(self), |f| f.cause.as_deref())
    }

    /// The most specific failure: the end of the cause chain.
    pub fn deepest(&self) -> &ParseFailure {
        self.chain().last().unwrap_or(self)
    }

    /// Indented multi-line description, outermost first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (depth, failure) in self.chain().enumerate() {
            let (line, column) = failure.cursor.line_column();
            if depth > 0 {
                out.push('\n');
            }
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!(
                "expected {} at {line}:{column}",
                failure.expected
            ));
        }
        out
    }
}

impl fmt::Debug for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ParseFailure");
        s.field("expected", &self.expected)
            .field("at", &self.cursor.index());
        if let Some(cause) = &self.cause {
            s.field("cause", cause);
        }
        s.finish()
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
