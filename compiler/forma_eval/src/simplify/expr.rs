//! Operators, indexing, attributes, calls and collection displays.
//!
//! Each node simplifies its children first and folds once all of them are
//! values. `and`/`or` fold as soon as the left operand is known.

use forma_ir::{BinaryOp, Expr, ExprKind, Origin, UnaryOp, Value};

use super::{Simplifier, SimplifyResult};
use crate::environment::Scope;
use crate::errors::EvalError;
use crate::methods::{call_value, get_attribute, index_value};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;

/// The values of `exprs`, if every one is resolved.
pub(super) fn resolved(exprs: &[Expr]) -> Option<Vec<Value>> {
    exprs.iter().map(|e| e.as_value().cloned()).collect()
}

fn folded(value: Value, origin: &Origin) -> Expr {
    Expr::value(value, origin.clone())
}

impl Simplifier<'_> {
    pub(super) fn unary(
        self,
        op: UnaryOp,
        operand: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let operand = self.simplify(operand, scope)?;
        match operand.as_value() {
            Some(value) => Ok(folded(evaluate_unary(op, value)?, origin)),
            None => Ok(Expr::unary(op, operand, origin.clone())),
        }
    }

    pub(super) fn binary(
        self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let lhs = self.simplify(lhs, scope)?;
        if op.is_short_circuit() {
            if let Some(left) = lhs.as_value() {
                let decided = match op {
                    BinaryOp::And => !left.is_truthy(),
                    _ => left.is_truthy(),
                };
                return if decided {
                    Ok(lhs)
                } else {
                    self.simplify(rhs, scope)
                };
            }
        }
        let rhs = self.simplify(rhs, scope)?;
        match (lhs.as_value(), rhs.as_value()) {
            (Some(left), Some(right)) => Ok(folded(evaluate_binary(op, left, right)?, origin)),
            _ => Ok(Expr::binary(op, lhs, rhs, origin.clone())),
        }
    }

    pub(super) fn index(
        self,
        base: &Expr,
        index: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let base = self.simplify(base, scope)?;
        let index = self.simplify(index, scope)?;
        match (base.as_value(), index.as_value()) {
            (Some(b), Some(i)) => Ok(folded(index_value(b, i)?, origin)),
            _ => Ok(Expr::index(base, index, origin.clone())),
        }
    }

    pub(super) fn call(
        self,
        callee: &Expr,
        args: &[Expr],
        kwargs: &[(String, Expr)],
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let callee = self.simplify(callee, scope)?;
        let args = self.simplify_all(args, scope)?;
        let kwargs = kwargs
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.simplify(value, scope)?)))
            .collect::<Result<Vec<_>, EvalError>>()?;

        if let (Some(f), Some(positional)) = (callee.as_value(), resolved(&args)) {
            let keywords: Option<Vec<(String, Value)>> = kwargs
                .iter()
                .map(|(name, value)| value.as_value().map(|v| (name.clone(), v.clone())))
                .collect();
            if let Some(keywords) = keywords {
                let value = call_value(f, &positional, &keywords, self.renderers)?;
                return Ok(folded(value, origin));
            }
        }
        Ok(Expr::call(callee, args, kwargs, origin.clone()))
    }

    pub(super) fn attribute(
        self,
        object: &Expr,
        name: &str,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let object = self.simplify(object, scope)?;
        match object.as_value() {
            Some(value) => Ok(folded(get_attribute(value, name)?, origin)),
            None => Ok(Expr::attribute(object, name, origin.clone())),
        }
    }

    pub(super) fn list(self, items: &[Expr], scope: &Scope<'_>, origin: &Origin) -> SimplifyResult {
        let items = self.simplify_all(items, scope)?;
        Ok(match resolved(&items) {
            Some(values) => folded(Value::from(values), origin),
            None => Expr::new(ExprKind::List(items), origin.clone()),
        })
    }

    pub(super) fn dict(
        self,
        entries: &[(Expr, Expr)],
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let entries = entries
            .iter()
            .map(|(k, v)| Ok((self.simplify(k, scope)?, self.simplify(v, scope)?)))
            .collect::<Result<Vec<_>, EvalError>>()?;
        let pairs: Option<Vec<(Value, Value)>> = entries
            .iter()
            .map(|(k, v)| Some((k.as_value()?.clone(), v.as_value()?.clone())))
            .collect();
        Ok(match pairs {
            Some(pairs) => folded(Value::mapping(pairs), origin),
            None => Expr::new(ExprKind::Dict(entries), origin.clone()),
        })
    }
}
