use std::sync::Arc;

use crate::outcome::{ParseFailure, ParseResult};
use crate::parser::Parser;

/// Number of leading characters `a` and `b` have in common.
pub fn find_mismatch(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Matches exactly `text`.
///
/// Named by the quoted text (`"foo"`). A failure carries a cause located at
/// the first character that differs from `text`.
pub fn literal(text: impl Into<Arc<str>>) -> Parser<Arc<str>> {
    let text: Arc<str> = text.into();
    let name = format!("{:?}", &*text);
    let expected = name.clone();
    Parser::new(name, move |cursor| {
        if cursor.remaining().starts_with(&*text) {
            return ParseResult::success(Arc::clone(&text), cursor.consume_str(&text));
        }
        let mismatch = find_mismatch(cursor.remaining(), &text);
        ParseResult::failure_with_cause(
            expected.as_str(),
            cursor.clone(),
            ParseFailure::new(expected.as_str(), cursor.consume(mismatch)),
        )
    })
}
