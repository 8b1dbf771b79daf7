//! Literal grammars: numbers, strings, constants and identifiers.

use forma_ir::{Expr, Value};

use crate::combinators::{
    alternation, identifier, keyword, literal, munch_while, non_empty, option, repetition,
    sequence, transform_consumed, transform_located, transform_result,
};
use crate::cursor::ParseContext;
use crate::outcome::{ParseFailure, ParseResult};
use crate::parser::Parser;

/// Words that are never identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "and", "or", "not", "in", "lambda", "if", "elif", "else", "for", "with", "True", "False",
    "None",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Digits with single `_` separators between groups (`1_000`).
fn digit_groups(name: &str, is_digit: fn(char) -> bool) -> Parser<String> {
    let group = non_empty(munch_while(name, is_digit));
    transform_consumed(sequence((
        group.clone(),
        repetition(sequence((literal("_"), group))),
    )))
}

fn radix_prefix(lower: &str, upper: &str) -> Parser<String> {
    transform_consumed(sequence((
        literal("0"),
        alternation([literal(lower), literal(upper)]),
    )))
}

fn parse_int(digits: &str, radix: u32) -> Option<i64> {
    i64::from_str_radix(&digits.replace('_', ""), radix).ok()
}

/// Integer literal: decimal, or `0b`/`0o`/`0x` prefixed, `_` grouping.
pub fn integer() -> Parser<Expr> {
    let prefixed = |lower: &str, upper: &str, radix: u32, is_digit: fn(char) -> bool| {
        let digits = digit_groups(&format!("base-{radix} digits"), is_digit);
        transform_result(
            sequence((radix_prefix(lower, upper), digits)),
            move |result, cursor| match result {
                ParseResult::Success(s) => match parse_int(&s.value.1, radix) {
                    Some(n) => ParseResult::success(n, s.cursor),
                    None => out_of_range(cursor),
                },
                ParseResult::Failure(f) => ParseResult::Failure(f),
            },
        )
    };
    let decimal = transform_result(
        digit_groups("digits", |c| c.is_ascii_digit()),
        |result, cursor| match result {
            ParseResult::Success(s) => match parse_int(&s.value, 10) {
                Some(n) => ParseResult::success(n, s.cursor),
                None => out_of_range(cursor),
            },
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    );
    let integer = alternation([
        prefixed("b", "B", 2, |c| matches!(c, '0' | '1')),
        prefixed("o", "O", 8, |c| matches!(c, '0'..='7')),
        prefixed("x", "X", 16, |c| c.is_ascii_hexdigit()),
        decimal,
    ])
    .named("integer");
    transform_located(integer, |n, cursor| Expr::value(n, cursor.origin()))
}

fn out_of_range<T>(cursor: &ParseContext) -> ParseResult<T> {
    ParseResult::failure("integer literal within 64-bit range", cursor.clone())
}

/// Float literal: digits with a fraction, an exponent, or both (`1.`, `1.5`,
/// `2e-3`, `1_0.2_5`).
pub fn float() -> Parser<Expr> {
    let digits = digit_groups("digits", |c| c.is_ascii_digit());
    let exponent = transform_consumed(sequence((
        alternation([literal("e"), literal("E")]),
        option(alternation([literal("+"), literal("-")])),
        digits.clone(),
    )));
    let fraction = transform_consumed(sequence((
        literal("."),
        option(digits.clone()),
        option(exponent.clone()),
    )));
    let float = transform_result(
        transform_consumed(sequence((digits, alternation([fraction, exponent])))),
        |result, cursor| match result {
            ParseResult::Success(s) => match s.value.replace('_', "").parse::<f64>() {
                Ok(x) => ParseResult::success(x, s.cursor),
                Err(_) => ParseResult::failure("float", cursor.clone()),
            },
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    )
    .named("float");
    transform_located(float, |x, cursor| Expr::value(x, cursor.origin()))
}

/// Single- or double-quoted string with backslash escapes.
pub fn string() -> Parser<Expr> {
    Parser::new("string", |cursor| match scan_string(cursor) {
        Ok((text, next)) => ParseResult::success(Expr::value(text, cursor.origin()), next),
        Err(cause) => ParseResult::failure_with_cause("string", cursor.clone(), cause),
    })
}

fn scan_string(cursor: &ParseContext) -> Result<(String, ParseContext), ParseFailure> {
    let quote = match cursor.peek() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(ParseFailure::new("quote", cursor.clone())),
    };
    let mut text = String::new();
    let mut current = cursor.consume(1);
    loop {
        let Some(c) = current.peek() else {
            return Err(ParseFailure::new(format!("closing {quote:?}"), current));
        };
        if c == quote {
            return Ok((text, current.consume(1)));
        }
        if c != '\\' {
            text.push(c);
            current = current.consume(1);
            continue;
        }
        let escape = current.consume(1);
        let (decoded, next) = match escape.peek() {
            Some('n') => ('\n', escape.consume(1)),
            Some('t') => ('\t', escape.consume(1)),
            Some('r') => ('\r', escape.consume(1)),
            Some('0') => ('\0', escape.consume(1)),
            Some(c @ ('\\' | '\'' | '"')) => (c, escape.consume(1)),
            Some('x') => {
                let digits = escape.consume(1).peek_chars(2).to_string();
                let code = (digits.len() == 2)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match code {
                    Some(c) => (c, escape.consume(3)),
                    None => return Err(ParseFailure::new("two hex digits", escape.consume(1))),
                }
            }
            Some('u') => unicode_escape(&escape.consume(1))?,
            _ => return Err(ParseFailure::new("escape sequence", current)),
        };
        text.push(decoded);
        current = next;
    }
}

/// `{XXXX}` after `\u`.
fn unicode_escape(cursor: &ParseContext) -> Result<(char, ParseContext), ParseFailure> {
    let rest = cursor.remaining();
    let decoded = rest
        .strip_prefix('{')
        .and_then(|r| r.split_once('}'))
        .filter(|(hex, _)| (1..=6).contains(&hex.len()))
        .and_then(|(hex, _)| u32::from_str_radix(hex, 16).ok().map(|n| (n, hex.len())))
        .and_then(|(n, len)| char::from_u32(n).map(|c| (c, len)));
    match decoded {
        Some((c, len)) => Ok((c, cursor.consume(len + 2))),
        None => Err(ParseFailure::new("unicode escape {XXXX}", cursor.clone())),
    }
}

/// `True`, `False` or `None`.
pub fn constant() -> Parser<Expr> {
    let word = |text: &'static str, value: Value| {
        transform_located(keyword(text), move |_, cursor| {
            Expr::value(value.clone(), cursor.origin())
        })
    };
    alternation([
        word("True", Value::Bool(true)),
        word("False", Value::Bool(false)),
        word("None", Value::None),
    ])
    .named("constant")
}

/// An identifier that is not a reserved word.
pub fn name() -> Parser<String> {
    let identifier = identifier();
    Parser::new("name", move |cursor| match identifier.parse(cursor) {
        ParseResult::Success(s) if !is_reserved(&s.value) => ParseResult::Success(s),
        ParseResult::Success(_) => ParseResult::failure("name", cursor.clone()),
        ParseResult::Failure(f) => ParseResult::failure_with_cause("name", cursor.clone(), f),
    })
}

/// A name as an [`Expr::identifier`] node.
pub fn identifier_expression() -> Parser<Expr> {
    transform_located(name(), |name, cursor| Expr::identifier(name, cursor.origin()))
}
