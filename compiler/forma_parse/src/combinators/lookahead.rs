use crate::outcome::ParseResult;
use crate::parser::Parser;

/// Runs `parser` but leaves the cursor where it was.
pub fn lookahead<T: 'static>(parser: Parser<T>) -> Parser<T> {
    let name = format!("lookahead({})", parser.name());
    let expected = name.clone();
    Parser::new(name, move |cursor| match parser.parse(cursor) {
        ParseResult::Success(s) => ParseResult::success(s.value, cursor.clone()),
        ParseResult::Failure(f) => {
            ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f)
        }
    })
}

/// Succeeds, consuming nothing, exactly when `parser` fails.
pub fn negative_lookahead<T: 'static>(parser: Parser<T>) -> Parser<()> {
    let name = format!("negative-lookahead({})", parser.name());
    let expected = name.clone();
    Parser::new(name, move |cursor| match parser.parse(cursor) {
        ParseResult::Success(_) => ParseResult::failure(expected.as_str(), cursor.clone()),
        ParseResult::Failure(_) => ParseResult::success((), cursor.clone()),
    })
}
