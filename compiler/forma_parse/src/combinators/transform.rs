use crate::cursor::ParseContext;
use crate::outcome::ParseResult;
use crate::parser::Parser;

/// Rewrites the whole result of `parser`.
///
/// `transform` also receives the cursor the parser started at, which is
/// where any failure it produces must point.
pub fn transform_result<T, U, F>(parser: Parser<T>, transform: F) -> Parser<U>
where
    T: 'static,
    F: Fn(ParseResult<T>, &ParseContext) -> ParseResult<U> + Send + Sync + 'static,
{
    let name = parser.name().to_string();
    Parser::new(name, move |cursor| transform(parser.parse(cursor), cursor))
}

/// Maps the success value of `parser`; failures are untouched.
pub fn transform_success<T, U, F>(parser: Parser<T>, transform: F) -> Parser<U>
where
    T: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let name = parser.name().to_string();
    Parser::new(name, move |cursor| parser.parse(cursor).map(&transform))
}

/// Maps the success value together with the cursor the match started at.
///
/// Grammar rules use this to stamp expression nodes with their origin.
pub fn transform_located<T, U, F>(parser: Parser<T>, transform: F) -> Parser<U>
where
    T: 'static,
    F: Fn(T, &ParseContext) -> U + Send + Sync + 'static,
{
    let name = parser.name().to_string();
    Parser::new(name, move |cursor| {
        parser.parse(cursor).map(|value| transform(value, cursor))
    })
}

/// Replaces the success value with the source text `parser` consumed.
pub fn transform_consumed<T: 'static>(parser: Parser<T>) -> Parser<String> {
    let name = parser.name().to_string();
    Parser::new(name, move |cursor| match parser.parse(cursor) {
        ParseResult::Success(s) => {
            let text = s.cursor.consumed_since(cursor).to_string();
            ParseResult::success(text, s.cursor)
        }
        ParseResult::Failure(f) => ParseResult::Failure(f),
    })
}
