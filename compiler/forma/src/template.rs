//! The `Template` aggregate.

use std::collections::BTreeSet;

use forma_eval::errors::unresolved_identifiers;
use forma_eval::{identifiers, simplify, EvalError, Renderers, Variables};
use forma_ir::{Expr, Origin};
use forma_parse::{
    parse_template_at, template_expression, ParseContext, ParseError, Segment,
    TemplateSyntaxConfig,
};

/// A parsed template: literal text, comments and expression segments.
///
/// Substituting never mutates the receiver; it returns a new template in
/// which resolved expressions have become text. Two templates are equal
/// when their segments are, regardless of where they were parsed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` under `syntax`.
    pub fn parse(source: &str, syntax: &TemplateSyntaxConfig) -> Result<Self, ParseError> {
        Self::parse_context(&ParseContext::new(source), syntax)
    }

    /// Parse `source`, naming `source_id` in every origin.
    pub fn parse_named(
        source: &str,
        source_id: &str,
        syntax: &TemplateSyntaxConfig,
    ) -> Result<Self, ParseError> {
        Self::parse_context(&ParseContext::new(source).with_source_id(source_id), syntax)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(source_id = cursor.source_id()))]
    fn parse_context(
        cursor: &ParseContext,
        syntax: &TemplateSyntaxConfig,
    ) -> Result<Self, ParseError> {
        let segments = parse_template_at(cursor, syntax)?;
        tracing::debug!(segments = segments.len(), "parsed template");
        Ok(Template { segments })
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Template { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names the template needs before it can render.
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Expr(expr) => Some(identifiers(expr)),
                Segment::Text(_) | Segment::Comment(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Substitute `variables` and fold whatever becomes computable.
    ///
    /// Resolved expressions are rendered to text and merged with adjacent
    /// text; empty text disappears. Unresolved expressions stay, reduced.
    #[tracing::instrument(level = "debug", skip_all, fields(segments = self.segments.len()))]
    pub fn substitute(
        &self,
        variables: &Variables,
        keep_comments: bool,
        renderers: &Renderers,
    ) -> Result<Template, EvalError> {
        let mut out = SegmentBuffer::default();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_text(text),
                Segment::Comment(_) => {
                    if keep_comments {
                        out.push(segment.clone());
                    }
                }
                Segment::Expr(expr) => {
                    let simplified = simplify(expr, variables, renderers)?;
                    match simplified.as_value() {
                        Some(value) => {
                            let text = renderers
                                .render(value)
                                .map_err(|e| e.or_origin(&expr.origin))?;
                            out.push_text(&text);
                        }
                        None => out.push(Segment::Expr(simplified)),
                    }
                }
            }
        }
        Ok(Template {
            segments: out.finish(),
        })
    }

    /// Render to text, failing with every name that is still missing.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(
        &self,
        variables: &Variables,
        renderers: &Renderers,
    ) -> Result<String, EvalError> {
        let substituted = self.substitute(variables, false, renderers)?;
        let mut text = String::new();
        for segment in &substituted.segments {
            match segment {
                Segment::Text(part) => text.push_str(part),
                Segment::Comment(_) | Segment::Expr(_) => {
                    return Err(unresolved_identifiers(substituted.identifiers()));
                }
            }
        }
        Ok(text)
    }

    /// The template as a single `Template` expression, comments dropped.
    pub fn to_expression(&self) -> Expr {
        let origin = self
            .segments
            .iter()
            .find_map(|segment| match segment {
                Segment::Expr(expr) => Some(expr.origin.clone()),
                Segment::Text(_) | Segment::Comment(_) => None,
            })
            .map_or_else(Origin::synthetic, |first| {
                Origin::new(1, 1, first.source_id.clone())
            });
        template_expression(&self.segments, origin)
    }
}

/// Output segments with adjacent text merged.
#[derive(Default)]
struct SegmentBuffer {
    segments: Vec<Segment>,
}

impl SegmentBuffer {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}
