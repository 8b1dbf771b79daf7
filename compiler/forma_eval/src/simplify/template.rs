//! Text concatenation.

use forma_ir::{Expr, ExprKind, Origin, Value};

use super::{Simplifier, SimplifyResult};
use crate::environment::Scope;

/// Rendered text waiting to be merged with its neighbours.
struct PendingText {
    text: String,
    origin: Option<Origin>,
}

impl PendingText {
    fn push(&mut self, text: &str, origin: &Origin) {
        self.text.push_str(text);
        self.origin.get_or_insert_with(|| origin.clone());
    }

    fn flush_into(&mut self, parts: &mut Vec<Expr>) {
        if let Some(origin) = self.origin.take() {
            let text = std::mem::take(&mut self.text);
            if !text.is_empty() {
                parts.push(Expr::value(text, origin));
            }
        }
    }
}

impl Simplifier<'_> {
    /// Resolved parts are rendered and adjacent runs of text merged. A
    /// template with nothing left unresolved becomes a single string.
    pub(super) fn template(
        self,
        parts: &[Expr],
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let mut merged = Vec::with_capacity(parts.len());
        let mut pending = PendingText {
            text: String::new(),
            origin: None,
        };
        for part in parts {
            let part = self.simplify(part, scope)?;
            match part.as_value() {
                Some(value) => {
                    let text = self
                        .renderers
                        .render(value)
                        .map_err(|e| e.or_origin(&part.origin))?;
                    pending.push(&text, &part.origin);
                }
                None => {
                    pending.flush_into(&mut merged);
                    merged.push(part);
                }
            }
        }

        if merged.is_empty() {
            return Ok(Expr::value(pending.text, origin.clone()));
        }
        pending.flush_into(&mut merged);
        Ok(Expr::new(ExprKind::Template(merged), origin.clone()))
    }
}
