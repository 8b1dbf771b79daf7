//! Expression grammar.
//!
//! Precedence, loosest first:
//!
//! | Layer | Operators |
//! |-------|-----------|
//! | lambda | `lambda a, b: body` |
//! | disjunction | `or` |
//! | conjunction | `and` |
//! | negation | `not` |
//! | comparison | `==` `!=` `<=` `<` `>=` `>` (chained) |
//! | membership | `in` `not in` |
//! | bitwise | `\|`, then `^`, then `&` |
//! | shift | `<<` `>>` |
//! | sum | `+` `-` |
//! | term | `*` `//` `/` `%` `@` |
//! | factor | unary `+` `-` `~` |
//! | power | `**` (right operand is a factor) |
//! | postfix | `[index]` `[start:stop:step]` `(args)` `.name` |
//!
//! Every layer is named, so failures read as "expected sum" rather than
//! spelling out the whole sub-grammar.

use std::sync::{Arc, OnceLock};

use forma_ir::{BinaryOp, Builtin, Expr, ExprKind, Names, UnaryOp, Value};
use rustc_hash::FxHashSet;

use super::literals::{constant, float, identifier_expression, integer, name, string};
use super::token;
use crate::combinators::{
    alternation, delimited, identifier, keyword, literal, negative_lookahead, option, repetition,
    sequence, transform_located, transform_result, transform_success, whitespace, Rule,
};
use crate::outcome::ParseResult;
use crate::parser::Parser;

static EXPRESSION: OnceLock<Parser<Expr>> = OnceLock::new();

/// The expression parser.
///
/// Built on first use and shared afterwards. Leading whitespace is skipped;
/// trailing whitespace is left for the caller.
pub fn expression() -> Parser<Expr> {
    EXPRESSION
        .get_or_init(|| {
            tracing::debug!("building expression grammar");
            build_expression()
        })
        .clone()
}

enum Argument {
    Positional(Expr),
    Keyword(String, Expr),
}

enum Postfix {
    Index(Expr),
    Call(Vec<Expr>, Vec<(String, Expr)>),
    Attribute(String),
}

fn symbol(text: &'static str) -> Parser<Arc<str>> {
    token(literal(text))
}

fn binary_operator(op: BinaryOp) -> Parser<BinaryOp> {
    let parser = match op {
        BinaryOp::NotIn => transform_success(
            sequence((keyword("not"), whitespace(), keyword("in"))),
            |_| (),
        ),
        op if op.is_word() => transform_success(keyword(op.as_symbol()), |_| ()),
        op => transform_success(literal(op.as_symbol()), |_| ()),
    };
    transform_success(token(parser), move |()| op)
}

fn unary_operator(op: UnaryOp) -> Parser<UnaryOp> {
    let parser = match op {
        UnaryOp::Not => keyword("not"),
        op => literal(op.as_symbol()),
    };
    transform_success(parser, move |_| op)
}

/// `operand (op operand)*`, folded to the left.
///
/// Operators sharing a prefix must be listed longest first.
fn binary_layer(name: &str, operand: Parser<Expr>, operators: &[BinaryOp]) -> Parser<Expr> {
    let operator = alternation(operators.iter().map(|&op| binary_operator(op)));
    let tail = repetition(sequence((operator, operand.clone())));
    transform_success(sequence((operand, tail)), |(first, rest)| {
        rest.into_iter().fold(first, |lhs, (op, rhs)| {
            let origin = lhs.origin.clone();
            Expr::binary(op, lhs, rhs, origin)
        })
    })
    .named(name)
}

/// `op* operand` for prefix operators, as a self-referencing rule.
fn prefix_layer(name: &str, operators: Parser<UnaryOp>, operand: Parser<Expr>) -> Parser<Expr> {
    let rule = Rule::new(name);
    let applied = token(transform_located(
        sequence((operators, rule.parser())),
        |(op, operand), cursor| Expr::unary(op, operand, cursor.origin()),
    ));
    rule.define(alternation([applied, operand]))
}

/// Chained comparisons become a conjunction of pairwise comparisons.
///
/// `a < b <= c` is `(a < b) and (b <= c)`; the shared operand `b` is
/// duplicated into both comparisons.
fn comparison_layer(operand: Parser<Expr>) -> Parser<Expr> {
    use BinaryOp::*;
    let operator = alternation([Eq, NotEq, LtEq, Lt, GtEq, Gt].map(binary_operator));
    let tail = repetition(sequence((operator, operand.clone())));
    transform_success(sequence((operand, tail)), |(first, rest)| {
        desugar_comparisons(first, rest)
    })
    .named("comparison")
}

fn desugar_comparisons(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    let mut lhs = first;
    let mut chain: Option<Expr> = None;
    for (op, rhs) in rest {
        let origin = lhs.origin.clone();
        let comparison = Expr::binary(op, lhs, rhs.clone(), origin);
        chain = Some(match chain {
            None => comparison,
            Some(previous) => {
                let origin = previous.origin.clone();
                Expr::binary(BinaryOp::And, previous, comparison, origin)
            }
        });
        lhs = rhs;
    }
    match chain {
        Some(chain) => chain,
        None => lhs,
    }
}

pub(super) fn has_duplicates<'a>(names: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = FxHashSet::default();
    names.into_iter().any(|name| !seen.insert(name))
}

fn argument(expression: Parser<Expr>) -> Parser<Argument> {
    let keyword_argument = transform_success(
        sequence((
            token(name()),
            symbol("="),
            negative_lookahead(literal("=")),
            expression.clone(),
        )),
        |(name, _, _, value)| Argument::Keyword(name, value),
    );
    let positional = transform_success(expression, Argument::Positional);
    alternation([keyword_argument, positional])
}

/// Positional arguments must precede keyword arguments, and keywords are
/// distinct.
fn split_arguments(arguments: Vec<Argument>) -> Option<(Vec<Expr>, Vec<(String, Expr)>)> {
    let mut args = Vec::new();
    let mut kwargs: Vec<(String, Expr)> = Vec::new();
    for argument in arguments {
        match argument {
            Argument::Positional(_) if !kwargs.is_empty() => return None,
            Argument::Positional(value) => args.push(value),
            Argument::Keyword(name, value) => kwargs.push((name, value)),
        }
    }
    if has_duplicates(kwargs.iter().map(|(name, _)| name.as_str())) {
        return None;
    }
    Some((args, kwargs))
}

/// `[start:stop:step]` contents, each part optional.
fn slice(expression: Parser<Expr>) -> Parser<Expr> {
    let part = option(expression);
    let step = option(sequence((symbol(":"), part.clone())));
    transform_located(
        sequence((part.clone(), symbol(":"), part, step)),
        |(start, _, stop, step), cursor| {
            let origin = cursor.origin();
            let bound = |part: Option<Expr>| {
                part.unwrap_or_else(|| Expr::value(Value::None, origin.clone()))
            };
            let args = vec![bound(start), bound(stop), bound(step.and_then(|(_, s)| s))];
            Expr::call(
                Expr::value(Builtin::slice(), origin.clone()),
                args,
                Vec::new(),
                origin.clone(),
            )
        },
    )
}

fn postfix_layer(primary: Parser<Expr>, expression: Parser<Expr>) -> Parser<Expr> {
    let index = transform_success(
        sequence((
            symbol("["),
            alternation([slice(expression.clone()), expression.clone()]),
            symbol("]"),
        )),
        |(_, index, _)| Postfix::Index(index),
    );
    let call = transform_result(
        sequence((
            symbol("("),
            delimited(symbol(","), argument(expression), true),
            symbol(")"),
        )),
        |result, cursor| match result {
            ParseResult::Success(s) => match split_arguments(s.value.1) {
                Some((args, kwargs)) => ParseResult::success(Postfix::Call(args, kwargs), s.cursor),
                None => ParseResult::failure(
                    "positional arguments before distinct keyword arguments",
                    cursor.clone(),
                ),
            },
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    );
    let attribute = transform_success(sequence((symbol("."), token(identifier()))), |(_, name)| {
        Postfix::Attribute(name)
    });
    let suffixes = repetition(alternation([index, call, attribute]));
    transform_success(sequence((primary, suffixes)), |(base, suffixes)| {
        suffixes.into_iter().fold(base, apply_postfix)
    })
    .named("postfix")
}

fn apply_postfix(base: Expr, suffix: Postfix) -> Expr {
    let origin = base.origin.clone();
    match suffix {
        Postfix::Index(index) => Expr::index(base, index, origin),
        Postfix::Call(args, kwargs) => Expr::call(base, args, kwargs, origin),
        Postfix::Attribute(name) => Expr::attribute(base, name, origin),
    }
}

fn simple(expression: Parser<Expr>) -> Parser<Expr> {
    let paren = transform_success(
        sequence((symbol("("), expression.clone(), symbol(")"))),
        |(_, inner, _)| inner,
    );
    let list = token(transform_located(
        sequence((
            literal("["),
            delimited(symbol(","), expression.clone(), true),
            symbol("]"),
        )),
        |(_, items, _), cursor| Expr::new(ExprKind::List(items), cursor.origin()),
    ));
    let entry = transform_success(
        sequence((expression.clone(), symbol(":"), expression)),
        |(key, _, value)| (key, value),
    );
    let dict = token(transform_located(
        sequence((literal("{"), delimited(symbol(","), entry, true), symbol("}"))),
        |(_, entries, _), cursor| Expr::new(ExprKind::Dict(entries), cursor.origin()),
    ));
    alternation([
        paren,
        list,
        dict,
        token(string()),
        token(float()),
        token(integer()),
        token(constant()),
        token(identifier_expression()),
    ])
    .named("simple expression")
}

fn lambda(expression: Parser<Expr>) -> Parser<Expr> {
    let params = delimited(symbol(","), token(name()), false);
    let lambda = transform_result(
        sequence((keyword("lambda"), params, symbol(":"), expression)),
        |result, cursor| match result {
            ParseResult::Success(s) => {
                let (_, params, _, body) = s.value;
                if has_duplicates(params.iter().map(String::as_str)) {
                    return ParseResult::failure("distinct lambda parameters", cursor.clone());
                }
                let params: Names = params.into_iter().collect();
                ParseResult::success(Expr::lambda(params, body, cursor.origin()), s.cursor)
            }
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    );
    token(lambda)
}

fn build_expression() -> Parser<Expr> {
    use BinaryOp::*;

    let rule = Rule::new("expression");
    let expression = rule.parser();

    let primary = simple(expression.clone());
    let postfix = postfix_layer(primary, expression.clone());

    let factor_rule = Rule::new("factor");
    let power = transform_success(
        sequence((
            postfix,
            option(sequence((binary_operator(Pow), factor_rule.parser()))),
        )),
        |(base, exponent)| match exponent {
            Some((op, exponent)) => {
                let origin = base.origin.clone();
                Expr::binary(op, base, exponent, origin)
            }
            None => base,
        },
    )
    .named("power");
    let signed = token(transform_located(
        sequence((
            alternation([UnaryOp::Pos, UnaryOp::Neg, UnaryOp::Invert].map(unary_operator)),
            factor_rule.parser(),
        )),
        |(op, operand), cursor| Expr::unary(op, operand, cursor.origin()),
    ));
    let factor = factor_rule.define(alternation([signed, power]));

    let term = binary_layer("term", factor, &[Mul, FloorDiv, Div, Mod, MatMul]);
    let sum = binary_layer("sum", term, &[Add, Sub]);
    let shift = binary_layer("shift", sum, &[Shl, Shr]);
    let bit_and = binary_layer("bitwise and", shift, &[BitAnd]);
    let bit_xor = binary_layer("bitwise xor", bit_and, &[BitXor]);
    let bit_or = binary_layer("bitwise or", bit_xor, &[BitOr]);
    let membership = binary_layer("membership", bit_or, &[In, NotIn]);
    let comparison = comparison_layer(membership);
    let negation = prefix_layer("negation", unary_operator(UnaryOp::Not), comparison);
    let conjunction = binary_layer("conjunction", negation, &[And]);
    let disjunction = binary_layer("disjunction", conjunction, &[Or]);

    rule.define(alternation([lambda(expression), disjunction]))
}
