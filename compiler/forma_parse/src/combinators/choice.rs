use crate::outcome::ParseResult;
use crate::parser::Parser;

/// Tries `parsers` in order and returns the first success.
///
/// When every alternative fails, the cause is the last attempted failure.
/// With no alternatives at all it fails immediately.
pub fn alternation<T: 'static>(parsers: impl IntoIterator<Item = Parser<T>>) -> Parser<T> {
    let parsers: Vec<Parser<T>> = parsers.into_iter().collect();
    let names: Vec<&str> = parsers.iter().map(Parser::name).collect();
    let name = format!("alternation({})", names.join(", "));
    let expected = name.clone();
    Parser::new(name, move |cursor| {
        let mut last = None;
        for parser in &parsers {
            match parser.parse(cursor) {
                ParseResult::Failure(f) => last = Some(f),
                success => return success,
            }
        }
        match last {
            Some(f) => ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f),
            None => ParseResult::failure("no alternative", cursor.clone()),
        }
    })
}

/// Succeeds with `Some` of `parser`'s value, or `None` without consuming.
pub fn option<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    Parser::new(format!("option({})", parser.name()), move |cursor| {
        match parser.parse(cursor) {
            ParseResult::Success(s) => ParseResult::success(Some(s.value), s.cursor),
            ParseResult::Failure(_) => ParseResult::success(None, cursor.clone()),
        }
    })
}

/// Applies `parser` until it fails, stalls, or the input ends.
///
/// Always succeeds. A success that consumes nothing ends the loop and is not
/// included, so a parser that can match the empty string cannot spin forever.
pub fn repetition<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(format!("repetition({})", parser.name()), move |cursor| {
        let mut values = Vec::new();
        let mut current = cursor.clone();
        while !current.at_eof() {
            match parser.parse(&current) {
                ParseResult::Success(s) if s.cursor.index() > current.index() => {
                    values.push(s.value);
                    current = s.cursor;
                }
                _ => break,
            }
        }
        ParseResult::success(values, current)
    })
}

/// Like `parser`, but a success that consumed nothing becomes a failure.
pub fn non_empty<T: 'static>(parser: Parser<T>) -> Parser<T> {
    let name = format!("non-empty({})", parser.name());
    let expected = name.clone();
    Parser::new(name, move |cursor| match parser.parse(cursor) {
        ParseResult::Success(s) if s.cursor.index() == cursor.index() => {
            ParseResult::failure(expected.as_str(), cursor.clone())
        }
        ParseResult::Failure(f) => {
            ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f)
        }
        success => success,
    })
}
