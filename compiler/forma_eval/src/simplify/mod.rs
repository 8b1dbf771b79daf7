//! Partial evaluation.
//!
//! [`simplify`] substitutes the known variables into a tree and folds every
//! node whose children are all resolved. The result is never larger than the
//! input and has no free identifiers besides the input's unknown ones.
//! [`evaluate`] is `simplify` followed by unwrapping the root value.
//!
//! The walk is split by node category:
//! - `expr`: operators, indexing, attributes, calls, list and dict displays
//! - `control`: `if`, `for`, `with` and `lambda`
//! - `template`: text concatenation through the renderer registry

mod control;
mod expr;
mod template;

use forma_ir::{Expr, ExprKind};
use forma_stack::ensure_sufficient_stack;

use crate::environment::{Scope, Variables};
use crate::errors::{unresolved_identifiers, EvalError, EvalResult};
use crate::identifiers::identifiers;
use crate::renderers::Renderers;

/// Result of simplifying one node.
pub type SimplifyResult = Result<Expr, EvalError>;

/// Simplify `expr` under `variables`.
#[tracing::instrument(level = "trace", skip_all)]
pub fn simplify(expr: &Expr, variables: &Variables, renderers: &Renderers) -> SimplifyResult {
    simplify_in(expr, &Scope::new(variables), renderers)
}

/// Simplify `expr` under `variables` and unwrap the resolved value.
///
/// Fails with an unresolved-identifiers error listing every free name that
/// remains after simplification.
#[tracing::instrument(level = "trace", skip_all)]
pub fn evaluate(expr: &Expr, variables: &Variables, renderers: &Renderers) -> EvalResult {
    simplify(expr, variables, renderers)?
        .into_value()
        .map_err(|rest| unresolved_identifiers(identifiers(&rest)).with_origin(rest.origin))
}

/// Simplify `expr` under an explicit scope.
pub(crate) fn simplify_in(expr: &Expr, scope: &Scope<'_>, renderers: &Renderers) -> SimplifyResult {
    Simplifier { renderers }.simplify(expr, scope)
}

/// Tree walker carrying the state shared by every node.
#[derive(Clone, Copy)]
struct Simplifier<'r> {
    renderers: &'r Renderers,
}

impl Simplifier<'_> {
    fn simplify(self, expr: &Expr, scope: &Scope<'_>) -> SimplifyResult {
        ensure_sufficient_stack(|| self.simplify_inner(expr, scope))
            .map_err(|e| e.or_origin(&expr.origin))
    }

    fn simplify_inner(self, expr: &Expr, scope: &Scope<'_>) -> SimplifyResult {
        let origin = &expr.origin;
        match &expr.kind {
            ExprKind::Value(_) => Ok(expr.clone()),
            ExprKind::Identifier(name) => Ok(match scope.get(name) {
                Some(value) => Expr::value(value.clone(), origin.clone()),
                None => expr.clone(),
            }),
            ExprKind::Unary { op, operand } => self.unary(*op, operand, scope, origin),
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, scope, origin),
            ExprKind::Index { base, index } => self.index(base, index, scope, origin),
            ExprKind::Call {
                callee,
                args,
                kwargs,
            } => self.call(callee, args, kwargs, scope, origin),
            ExprKind::Attribute { object, name } => self.attribute(object, name, scope, origin),
            ExprKind::List(items) => self.list(items, scope, origin),
            ExprKind::Dict(entries) => self.dict(entries, scope, origin),
            ExprKind::Lambda { params, body } => self.lambda(params, body, scope, origin),
            ExprKind::If(cases) => self.if_cases(cases, scope, origin),
            ExprKind::For {
                names,
                iterable,
                body,
            } => self.for_each(names, iterable, body, scope, origin),
            ExprKind::With { bindings, body } => self.with(bindings, body, scope, origin),
            ExprKind::Template(parts) => self.template(parts, scope, origin),
        }
    }

    /// Simplify every expression in `exprs`.
    fn simplify_all(self, exprs: &[Expr], scope: &Scope<'_>) -> Result<Vec<Expr>, EvalError> {
        exprs.iter().map(|e| self.simplify(e, scope)).collect()
    }
}
