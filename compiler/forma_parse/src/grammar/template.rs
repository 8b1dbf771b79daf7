//! Template grammar.
//!
//! A template is a sequence of [`Segment`]s: literal text, comments,
//! expression blocks (`{{ expr }}`) and control blocks (`{% if %}`,
//! `{% for %}`, `{% with %}`, `{% literal %}`). Control block bodies are
//! templates themselves and become [`ExprKind::Template`] nodes, so the
//! whole block is a single expression.

use std::sync::{Arc, OnceLock};

use forma_ir::{Binding, Builtin, Expr, ExprKind, IfCase, Names, Origin};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::expr::{expression, has_duplicates};
use super::literals::name;
use super::token;
use crate::combinators::{
    alternation, case, delimited, keyword, literal, non_empty, not_in, nothing, option,
    repetition, sequence, switch, transform_located, transform_result, transform_success, until,
    Rule,
};
use crate::cursor::ParseContext;
use crate::outcome::{ParseFailure, ParseResult};
use crate::parser::Parser;
use crate::syntax::{BlockSyntaxConfig, TemplateSyntaxConfig};

/// One piece of a parsed template.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// Literal text, passed through unchanged.
    Text(String),
    /// Comment body, without its markers.
    Comment(String),
    /// An expression block or a control block.
    Expr(Expr),
}

impl Segment {
    /// The segment as part of an [`ExprKind::Template`]; comments have none.
    pub fn to_part(&self, origin: &Origin) -> Option<Expr> {
        match self {
            Segment::Text(text) => Some(Expr::value(text.as_str(), origin.clone())),
            Segment::Comment(_) => None,
            Segment::Expr(expr) => Some(expr.clone()),
        }
    }
}

/// The parsers for one syntax configuration.
#[derive(Clone, Debug)]
pub struct TemplateGrammar {
    /// Zero or more segments; stops where no segment matches.
    pub body: Parser<Vec<Segment>>,
    /// A single segment. Used to explain why `body` stopped early.
    pub segment: Parser<Segment>,
}

type GrammarCache = Mutex<FxHashMap<TemplateSyntaxConfig, TemplateGrammar>>;

static TEMPLATE_GRAMMARS: OnceLock<GrammarCache> = OnceLock::new();

/// The template grammar for `syntax`, built once per distinct syntax.
pub fn template(syntax: &TemplateSyntaxConfig) -> TemplateGrammar {
    let cache = TEMPLATE_GRAMMARS.get_or_init(|| Mutex::new(FxHashMap::default()));
    let mut cache = cache.lock();
    if let Some(grammar) = cache.get(syntax) {
        tracing::trace!(?syntax, "template grammar cache hit");
        return grammar.clone();
    }
    tracing::debug!(?syntax, "building template grammar");
    let grammar = build_template(syntax);
    cache.insert(syntax.clone(), grammar.clone());
    grammar
}

fn symbol(text: &str) -> Parser<Arc<str>> {
    token(literal(text))
}

/// `open <word> <inner> close`, as a control tag.
fn tag<T: 'static>(block: &BlockSyntaxConfig, word: &str, inner: Parser<T>) -> Parser<T> {
    transform_success(
        sequence((
            literal(block.open()),
            token(keyword(word)),
            inner,
            symbol(block.close()),
        )),
        |(_, _, inner, _)| inner,
    )
}

/// Guard for a control block: the open marker followed by `word`.
fn opens(block: &BlockSyntaxConfig, word: &str) -> Parser<Arc<str>> {
    transform_success(
        sequence((literal(block.open()), token(keyword(word)))),
        |(_, word)| word,
    )
}

/// Text up to the next open marker; never empty.
fn text(syntax: &TemplateSyntaxConfig) -> Parser<Segment> {
    let markers = syntax.open_markers().map(|marker| literal(marker));
    transform_success(non_empty(not_in(markers)), Segment::Text).named("text")
}

/// A comment. Comments nest: an inner open marker must be closed before the
/// outer comment ends, and the inner markers stay part of the text.
fn comment(block: &BlockSyntaxConfig) -> Parser<Segment> {
    let rule: Rule<String> = Rule::new("comment");
    let (open, close) = (block.open().to_string(), block.close().to_string());
    let nested = transform_success(rule.parser(), move |inner| format!("{open}{inner}{close}"));
    let plain = non_empty(not_in([literal(block.open()), literal(block.close())]));
    let inner = transform_success(
        sequence((
            literal(block.open()),
            repetition(alternation([nested, plain])),
            literal(block.close()),
        )),
        |(_, pieces, _)| pieces.concat(),
    );
    transform_success(rule.define(inner), Segment::Comment)
}

/// `{{ expr }}`.
fn expression_block(block: &BlockSyntaxConfig) -> Parser<Segment> {
    transform_success(
        sequence((literal(block.open()), expression(), symbol(block.close()))),
        |(_, expr, _)| Segment::Expr(expr),
    )
    .named("expression block")
}

/// A template body starting at the cursor, as an [`ExprKind::Template`].
fn body(template: &Rule<Vec<Segment>>) -> Parser<Expr> {
    transform_located(template.parser(), |segments, cursor| {
        template_expression(&segments, cursor.origin())
    })
}

/// One or more comma separated names, all distinct.
fn names() -> Parser<Names> {
    transform_result(
        delimited(symbol(","), token(name()), false),
        |result, cursor| match result {
            ParseResult::Success(s) if s.value.is_empty() => {
                ParseResult::failure("binding names", cursor.clone())
            }
            ParseResult::Success(s) => {
                if has_duplicates(s.value.iter().map(String::as_str)) {
                    return ParseResult::failure("distinct binding names", cursor.clone());
                }
                let names: Names = s.value.into_iter().collect();
                ParseResult::success(names, s.cursor)
            }
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    )
}

/// `{% if c %}..{% elif c %}..{% else %}..{% endif %}`.
///
/// Without an `else`, a final always-true case with an empty body makes the
/// block render as nothing when no condition holds.
fn if_block(block: &BlockSyntaxConfig, template: &Rule<Vec<Segment>>) -> Parser<Segment> {
    let head = sequence((tag(block, "if", expression()), body(template)));
    let elifs = repetition(sequence((tag(block, "elif", expression()), body(template))));
    let otherwise = option(transform_success(
        sequence((tag(block, "else", nothing()), body(template))),
        |(_, body)| body,
    ));
    let end = tag(block, "endif", nothing());
    transform_located(
        sequence((head, elifs, otherwise, end)),
        |((condition, body), elifs, otherwise, _), cursor| {
            let origin = cursor.origin();
            let mut cases = vec![IfCase { condition, body }];
            cases.extend(
                elifs
                    .into_iter()
                    .map(|(condition, body)| IfCase { condition, body }),
            );
            let fallback =
                otherwise.unwrap_or_else(|| Expr::new(ExprKind::Template(Vec::new()), origin.clone()));
            cases.push(IfCase {
                condition: Expr::value(true, origin.clone()),
                body: fallback,
            });
            Segment::Expr(Expr::new(ExprKind::If(cases), origin))
        },
    )
    .named("if block")
}

/// `{% for a, b in xs %}..{% endfor %}`, rendered as the concatenation of
/// the per-item bodies.
fn for_block(block: &BlockSyntaxConfig, template: &Rule<Vec<Segment>>) -> Parser<Segment> {
    let header = transform_success(
        sequence((names(), token(keyword("in")), expression())),
        |(names, _, iterable)| (names, iterable),
    );
    let end = tag(block, "endfor", nothing());
    transform_located(
        sequence((tag(block, "for", header), body(template), end)),
        |((names, iterable), body, _), cursor| {
            let origin = cursor.origin();
            let each = Expr::for_each(names, iterable, body, origin.clone());
            let concat = Expr::value(Builtin::concat(), origin.clone());
            Segment::Expr(Expr::call(concat, vec![each], Vec::new(), origin))
        },
    )
    .named("for block")
}

/// `{% with a = x; b, c = y %}..{% endwith %}`.
fn with_block(block: &BlockSyntaxConfig, template: &Rule<Vec<Segment>>) -> Parser<Segment> {
    let binding = transform_success(
        sequence((names(), symbol("="), expression())),
        |(names, _, value)| Binding { names, value },
    );
    let bindings = transform_result(
        delimited(symbol(";"), binding, true),
        |result, cursor| match result {
            ParseResult::Success(s) if s.value.is_empty() => {
                ParseResult::failure("bindings", cursor.clone())
            }
            ParseResult::Success(s) => {
                let bound = s.value.iter().flat_map(|b| b.names.iter());
                if has_duplicates(bound.map(String::as_str)) {
                    return ParseResult::failure("distinct binding names", cursor.clone());
                }
                ParseResult::Success(s)
            }
            ParseResult::Failure(f) => ParseResult::Failure(f),
        },
    );
    let end = tag(block, "endwith", nothing());
    transform_located(
        sequence((tag(block, "with", bindings), body(template), end)),
        |(bindings, body, _), cursor| {
            Segment::Expr(Expr::with(bindings, body, cursor.origin()))
        },
    )
    .named("with block")
}

/// `{% literal tag %}..{% endliteral tag %}`: the content is kept verbatim.
///
/// The optional tag lets literal content contain a plain `endliteral` tag.
fn literal_block(block: &BlockSyntaxConfig) -> Parser<Segment> {
    let open = tag(block, "literal", option(token(name())));
    let (open_marker, close_marker) = (block.open().to_string(), block.close().to_string());
    Parser::new("literal block", move |cursor| {
        let (label, content_start) = match open.parse(cursor) {
            ParseResult::Success(s) => (s.value, s.cursor),
            ParseResult::Failure(f) => {
                return ParseResult::failure_with_cause("literal block", cursor.clone(), f)
            }
        };
        let end = literal_end(&open_marker, &close_marker, label.as_deref());
        let content = until(end.clone()).parse(&content_start);
        let ParseResult::Success(content) = content else {
            return ParseResult::failure("literal block", cursor.clone());
        };
        match end.parse(&content.cursor) {
            ParseResult::Success(s) => ParseResult::success(Segment::Text(content.value), s.cursor),
            ParseResult::Failure(f) => {
                ParseResult::failure_with_cause("literal block", cursor.clone(), f)
            }
        }
    })
}

fn literal_end(open: &str, close: &str, label: Option<&str>) -> Parser<()> {
    let label = match label {
        Some(label) => transform_success(token(keyword(label)), |_| ()),
        None => nothing(),
    };
    transform_success(
        sequence((literal(open), token(keyword("endliteral")), label, symbol(close))),
        |_| (),
    )
}

fn control_block(block: &BlockSyntaxConfig, template: &Rule<Vec<Segment>>) -> Parser<Segment> {
    switch(
        vec![
            case(opens(block, "if"), if_block(block, template)),
            case(opens(block, "for"), for_block(block, template)),
            case(opens(block, "with"), with_block(block, template)),
            case(opens(block, "literal"), literal_block(block)),
        ],
        None,
    )
    .named("control block")
}

fn build_template(syntax: &TemplateSyntaxConfig) -> TemplateGrammar {
    let rule: Rule<Vec<Segment>> = Rule::new("template");
    let segment = alternation([
        text(syntax),
        comment(syntax.comment()),
        expression_block(syntax.expression()),
        control_block(syntax.environment(), &rule),
    ]);
    let body = rule.define(repetition(segment.clone()));
    TemplateGrammar { body, segment }
}

/// Parses a template from `cursor` to the end of its input.
///
/// Leftover input is reported with the failure of the segment that could not
/// be parsed there as cause.
pub(crate) fn parse_segments(
    grammar: &TemplateGrammar,
    cursor: &ParseContext,
) -> Result<Vec<Segment>, ParseFailure> {
    let parsed = match grammar.body.parse(cursor) {
        ParseResult::Success(s) => s,
        ParseResult::Failure(f) => return Err(f),
    };
    if parsed.cursor.at_eof() {
        return Ok(parsed.value);
    }
    let stop = parsed.cursor;
    let failure = ParseFailure::new("excess content", stop.clone());
    Err(match grammar.segment.parse(&stop) {
        ParseResult::Failure(cause) => failure.with_cause(cause),
        ParseResult::Success(_) => failure,
    })
}

/// Wraps `segments` as the root [`ExprKind::Template`].
pub fn template_expression(segments: &[Segment], origin: Origin) -> Expr {
    let parts = segments.iter().filter_map(|s| s.to_part(&origin)).collect();
    Expr::new(ExprKind::Template(parts), origin)
}
