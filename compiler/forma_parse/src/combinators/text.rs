use crate::outcome::ParseResult;
use crate::parser::Parser;

/// Consumes the longest prefix accepted by `predicate`.
///
/// The predicate sees successively longer non-empty prefixes and the scan
/// stops at the first one it rejects. Always succeeds, possibly with an empty
/// match.
pub fn munch<F>(name: &str, predicate: F) -> Parser<String>
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Parser::new(format!("munch({name})"), move |cursor| {
        let rest = cursor.remaining();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let candidate = i + c.len_utf8();
            if !predicate(&rest[..candidate]) {
                break;
            }
            end = candidate;
        }
        let matched = &rest[..end];
        ParseResult::success(matched.to_string(), cursor.consume_str(matched))
    })
}

/// [`munch`] for per-character predicates, checking each character once.
pub fn munch_while<F>(name: &str, predicate: F) -> Parser<String>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(format!("munch({name})"), move |cursor| {
        let rest = cursor.remaining();
        let end = rest.find(|c: char| !predicate(c)).unwrap_or(rest.len());
        let matched = &rest[..end];
        ParseResult::success(matched.to_string(), cursor.consume_str(matched))
    })
}

/// Consumes input until one of `terminators` would match, or to the end.
///
/// Never fails and never consumes the terminator. Named `not-in(...)`.
pub fn not_in<T: 'static>(terminators: impl IntoIterator<Item = Parser<T>>) -> Parser<String> {
    let terminators: Vec<Parser<T>> = terminators.into_iter().collect();
    let names: Vec<&str> = terminators.iter().map(Parser::name).collect();
    let name = format!("not-in({})", names.join(", "));
    scan_until(name, terminators)
}

/// Consumes input until `terminator` would match, or to the end.
pub fn until<T: 'static>(terminator: Parser<T>) -> Parser<String> {
    let name = format!("until({})", terminator.name());
    scan_until(name, vec![terminator])
}

fn scan_until<T: 'static>(name: String, terminators: Vec<Parser<T>>) -> Parser<String> {
    Parser::new(name, move |cursor| {
        let mut current = cursor.clone();
        while !current.at_eof() && !terminators.iter().any(|t| t.parse(&current).is_success()) {
            current = current.consume(1);
        }
        let text = current.consumed_since(cursor).to_string();
        ParseResult::success(text, current)
    })
}

/// Zero or more `content` separated by `delimiter`.
///
/// A trailing delimiter is consumed only when `allow_trailing` is set. If no
/// `content` matches, succeeds with nothing consumed.
pub fn delimited<D: 'static, T: 'static>(
    delimiter: Parser<D>,
    content: Parser<T>,
    allow_trailing: bool,
) -> Parser<Vec<T>> {
    let name = format!("delimited({}, {})", content.name(), delimiter.name());
    Parser::new(name, move |cursor| {
        let mut values = Vec::new();
        let mut current = match content.parse(cursor) {
            ParseResult::Success(s) => {
                values.push(s.value);
                s.cursor
            }
            ParseResult::Failure(_) => return ParseResult::success(values, cursor.clone()),
        };
        while let ParseResult::Success(delim) = delimiter.parse(&current) {
            match content.parse(&delim.cursor) {
                ParseResult::Success(s) if s.cursor.index() > current.index() => {
                    values.push(s.value);
                    current = s.cursor;
                }
                ParseResult::Success(_) => break,
                ParseResult::Failure(_) => {
                    if allow_trailing {
                        current = delim.cursor;
                    }
                    break;
                }
            }
        }
        ParseResult::success(values, current)
    })
}
