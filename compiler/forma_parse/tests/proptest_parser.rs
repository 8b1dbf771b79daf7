//! Property-based tests for the combinator engine and grammars.
//!
//! Random inputs check the cursor contract (failures never consume), the
//! literal round trip, and that the grammars return errors instead of
//! panicking on arbitrary text.

use forma_ir::{Origin, Value};
use forma_parse::combinators::{
    alternation, delimited, identifier, keyword, literal, lookahead, negative_lookahead,
    non_empty, option, repetition, sequence, transform_success, whitespace,
};
use forma_parse::{
    parse_expression, parse_template, ParseContext, ParseResult, Parser, Segment,
    TemplateSyntaxConfig,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Short strings over an alphabet dense in template markers.
fn arb_source() -> impl Strategy<Value = String> {
    "[ab{}#% ()\\[\\],:=+*<'\"x0-9]{0,24}"
}

/// Identifier-like words, some of them keywords.
fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}",
        Just("in".to_string()),
        Just("not".to_string()),
        Just("lambda".to_string()),
    ]
}

fn unit<T: 'static>(parser: Parser<T>) -> Parser<()> {
    transform_success(parser, |_| ())
}

fn sample_parsers() -> Vec<Parser<()>> {
    vec![
        unit(literal("ab")),
        unit(sequence((literal("a"), literal("b"), literal("{")))),
        unit(alternation([literal("{#"), literal("x"), literal("%}")])),
        unit(non_empty(whitespace())),
        unit(lookahead(literal("b"))),
        unit(negative_lookahead(literal("a"))),
        unit(keyword("in")),
        unit(identifier()),
        unit(sequence((option(literal("a")), repetition(literal("b")), literal(":")))),
        unit(delimited(literal(","), identifier(), true)),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn failures_never_consume(source in arb_source(), offset in 0usize..8) {
        let cursor = ParseContext::new(source.as_str()).consume(offset);
        for parser in sample_parsers() {
            if let ParseResult::Failure(f) = parser.parse(&cursor) {
                prop_assert_eq!(&f.cursor, &cursor, "{} moved the cursor", parser.name());
            }
        }
    }

    #[test]
    fn literal_round_trip(text in "[a-z{}#% ]{0,10}", rest in "[a-z ]{0,10}") {
        let source = format!("{text}{rest}");
        match literal(text.as_str()).parse(&ParseContext::new(source.as_str())) {
            ParseResult::Success(s) => {
                prop_assert_eq!(&*s.value, text.as_str());
                prop_assert_eq!(s.cursor.index(), text.len());
            }
            ParseResult::Failure(f) => prop_assert!(false, "literal failed:\n{}", f),
        }
    }

    #[test]
    fn keywords_need_a_boundary(word in arb_word(), tail in "[a-z0-9_]{1,4}") {
        let source = format!("{word}{tail}");
        let result = keyword(&word).parse(&ParseContext::new(source.as_str()));
        prop_assert!(result.is_failure());
    }

    #[test]
    fn decimal_integers_parse(n in 0i64..=i64::MAX) {
        let parsed = parse_expression(&n.to_string());
        prop_assert_eq!(parsed.ok(), Some(forma_ir::Expr::value(Value::Int(n), Origin::synthetic())));
    }

    #[test]
    fn expression_parser_never_panics(source in arb_source()) {
        let _ = parse_expression(&source);
    }

    #[test]
    fn template_parser_never_panics(source in arb_source()) {
        let _ = parse_template(&source, &TemplateSyntaxConfig::default());
    }

    #[test]
    fn marker_free_text_is_one_segment(source in "[a-z {}#%\n]{1,30}") {
        prop_assume!(!["{#", "{{", "{%"].iter().any(|m| source.contains(m)));
        let segments = parse_template(&source, &TemplateSyntaxConfig::default());
        prop_assert_eq!(segments.ok(), Some(vec![Segment::Text(source.clone())]));
    }
}
