//! The forma grammars, built entirely from combinators.
//!
//! - [`expression`]: the expression language (precedence layers, postfix
//!   operators, literals, lambdas)
//! - [`template`]: literal text interleaved with comments, expression blocks
//!   and control blocks, for one [`TemplateSyntaxConfig`](crate::TemplateSyntaxConfig)
//!
//! Both are expensive to build, so they are built once (per syntax, for
//! templates) and shared.

mod expr;
mod literals;
mod template;

pub use expr::expression;
pub use literals::{is_reserved, RESERVED_WORDS};
pub(crate) use template::parse_segments;
pub use template::{template, template_expression, Segment, TemplateGrammar};

use crate::combinators::whitespace;
use crate::outcome::{ParseFailure, ParseResult};
use crate::parser::Parser;

/// `parser` after optional whitespace.
///
/// Keeps `parser`'s name. A failure is reported at the caller's cursor, with
/// the same cause chain.
pub(crate) fn token<T: 'static>(parser: Parser<T>) -> Parser<T> {
    let space = whitespace();
    let name = parser.name().to_string();
    Parser::new(name, move |cursor| {
        let start = space.parse(cursor).cursor().clone();
        match parser.parse(&start) {
            ParseResult::Failure(f) => ParseResult::Failure(ParseFailure {
                cursor: cursor.clone(),
                ..f
            }),
            success => success,
        }
    })
}
