//! Shared helpers for scenario tests.

use forma::{
    parse_expression, Expr, RenderKey, Renderers, Segment, Template, TemplateSyntaxConfig, Value,
    ValueKind, Variables,
};

pub fn vars(entries: &[(&str, Value)]) -> Variables {
    entries
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

pub fn parse(source: &str) -> Template {
    Template::parse(source, &TemplateSyntaxConfig::default()).unwrap()
}

/// Default renderers plus `bool`, for templates that print comparisons.
pub fn with_bool() -> Renderers {
    Renderers::default().with_display(RenderKey::Exact(ValueKind::Bool))
}

pub fn text(s: &str) -> Segment {
    Segment::Text(s.to_string())
}

pub fn expr(source: &str) -> Segment {
    Segment::Expr(parse_expression(source).unwrap())
}

pub fn expression(source: &str) -> Expr {
    parse_expression(source).unwrap()
}
