use std::sync::Arc;

use super::literal::literal;
use crate::outcome::ParseResult;
use crate::parser::Parser;

/// Always succeeds without consuming.
pub fn nothing() -> Parser<()> {
    Parser::new("nothing", |cursor| ParseResult::success((), cursor.clone()))
}

/// Succeeds only at the end of input.
pub fn eof() -> Parser<()> {
    Parser::new("eof", |cursor| {
        if cursor.at_eof() {
            ParseResult::success((), cursor.clone())
        } else {
            ParseResult::failure("eof", cursor.clone())
        }
    })
}

/// Zero or more whitespace characters.
pub fn whitespace() -> Parser<String> {
    super::text::munch_while("whitespace", char::is_whitespace).named("whitespace")
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(crate) fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// A non-empty identifier: a letter or `_`, then letters, digits or `_`.
pub fn identifier() -> Parser<String> {
    Parser::new("identifier", |cursor| {
        let rest = cursor.remaining();
        match rest.chars().next() {
            Some(first) if is_identifier_start(first) => {
                let end = rest
                    .find(|c: char| !is_identifier_continue(c))
                    .unwrap_or(rest.len());
                let name = &rest[..end];
                ParseResult::success(name.to_string(), cursor.consume_str(name))
            }
            _ => ParseResult::failure("identifier", cursor.clone()),
        }
    })
}

/// `word` not followed by another identifier character.
///
/// `keyword("in")` matches the `in` of `in x` but not of `index`.
pub fn keyword(word: &str) -> Parser<Arc<str>> {
    let name = format!("keyword({word:?})");
    let expected = name.clone();
    let word = literal(word);
    Parser::new(name, move |cursor| match word.parse(cursor) {
        ParseResult::Success(s) if !s.cursor.peek().is_some_and(is_identifier_continue) => {
            ParseResult::Success(s)
        }
        ParseResult::Success(_) => ParseResult::failure(expected.as_str(), cursor.clone()),
        ParseResult::Failure(f) => {
            ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f)
        }
    })
}
