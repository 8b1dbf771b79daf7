//! Forma parser - combinator engine and grammars for the forma template
//! language.
//!
//! # Architecture
//!
//! - [`ParseContext`]: immutable cursor over shared source text
//! - [`ParseResult`]: success (value + cursor) or [`ParseFailure`] with a
//!   nested cause chain
//! - [`Parser`]: a named function from cursor to result
//! - [`combinators`]: build larger parsers from smaller ones, naming them
//!   after their children
//! - [`grammar`]: the expression and template grammars, built from
//!   combinators only
//!
//! There is no lexer. Grammars match characters directly, backtracking by
//! returning to an earlier cursor.
//!
//! # Entry points
//!
//! [`parse_expression`] and [`parse_template`] require the whole input to
//! match and turn a failure into a [`ParseError`].

pub mod combinators;
mod cursor;
mod error;
pub mod grammar;
mod outcome;
mod parser;
mod syntax;

pub use cursor::ParseContext;
pub use error::ParseError;
pub use grammar::{expression, template, template_expression, Segment, TemplateGrammar};
pub use outcome::{ParseFailure, ParseResult, ParseSuccess};
pub use parser::Parser;
pub use syntax::{BlockSyntaxConfig, SyntaxConfigError, TemplateSyntaxBuilder, TemplateSyntaxConfig};

use forma_ir::Expr;

use crate::combinators::whitespace;

/// Parse `source` as a single expression, surrounding whitespace allowed.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    parse_expression_at(&ParseContext::new(source))
}

/// [`parse_expression`] from an existing cursor, to the end of its input.
pub fn parse_expression_at(cursor: &ParseContext) -> Result<Expr, ParseError> {
    let parsed = match expression().parse(cursor) {
        ParseResult::Success(s) => s,
        ParseResult::Failure(f) => return Err(ParseError::Mismatch(f)),
    };
    let end = whitespace().parse(&parsed.cursor).cursor().clone();
    if end.at_eof() {
        Ok(parsed.value)
    } else {
        Err(ParseError::ExcessContent(ParseFailure::new(
            "end of expression",
            end,
        )))
    }
}

/// Parse `source` as a template under `syntax`.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_template(
    source: &str,
    syntax: &TemplateSyntaxConfig,
) -> Result<Vec<Segment>, ParseError> {
    parse_template_at(&ParseContext::new(source), syntax)
}

/// [`parse_template`] from an existing cursor, to the end of its input.
///
/// Use [`ParseContext::with_source_id`] to have origins name a file.
pub fn parse_template_at(
    cursor: &ParseContext,
    syntax: &TemplateSyntaxConfig,
) -> Result<Vec<Segment>, ParseError> {
    let grammar = template(syntax);
    grammar::parse_segments(&grammar, cursor).map_err(ParseError::ExcessContent)
}

#[cfg(test)]
mod tests;
