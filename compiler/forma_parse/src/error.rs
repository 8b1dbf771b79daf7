//! Parse errors returned from the top-level entry points.

use thiserror::Error;

use crate::outcome::ParseFailure;

/// A source text that does not match the grammar.
///
/// Owns the whole failure tree, so callers can inspect every level; the
/// display form lists it outermost first, one indented line per level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar itself failed at the start of the input.
    #[error("{0}")]
    Mismatch(ParseFailure),
    /// A prefix parsed, but input remains that no rule accepts.
    #[error("{0}")]
    ExcessContent(ParseFailure),
}

impl ParseError {
    pub fn failure(&self) -> &ParseFailure {
        match self {
            ParseError::Mismatch(f) | ParseError::ExcessContent(f) => f,
        }
    }

    /// Line and column of the most specific mismatch.
    pub fn line_column(&self) -> (u32, u32) {
        self.failure().deepest().cursor.line_column()
    }

    /// What the most specific mismatch expected.
    pub fn expected(&self) -> &str {
        &self.failure().deepest().expected
    }
}
