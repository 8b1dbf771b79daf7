//! Binding and branching constructs: `lambda`, `if`, `for` and `with`.
//!
//! Names bound by a construct are hidden from the caller's scope while its
//! body simplifies, so an outer variable never leaks into a shadowing binding.

use std::collections::BTreeSet;
use std::sync::Arc;

use forma_ir::{Binding, Closure, Expr, ExprKind, IfCase, Names, Origin, Value};

use super::expr::resolved;
use super::{Simplifier, SimplifyResult};
use crate::destructure::{destructure, destructure_into, iterate};
use crate::environment::{Scope, Variables};
use crate::errors::duplicate_binding;
use crate::identifiers::{identifiers, is_closed};

impl Simplifier<'_> {
    /// A lambda whose body mentions nothing but its parameters becomes a
    /// closure value.
    pub(super) fn lambda(
        self,
        params: &Names,
        body: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let body = self.simplify(body, &scope.without(params))?;
        if identifiers(&body).iter().all(|name| params.contains(name)) {
            let closure = Closure {
                params: params.clone(),
                body,
            };
            return Ok(Expr::value(Value::Lambda(Arc::new(closure)), origin.clone()));
        }
        Ok(Expr::lambda(params.clone(), body, origin.clone()))
    }

    /// Cases with a known false condition drop out. A known true condition
    /// makes every later case unreachable; when it is also the first
    /// remaining case, its body replaces the whole node.
    pub(super) fn if_cases(
        self,
        cases: &[IfCase],
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let mut kept = Vec::with_capacity(cases.len());
        for case in cases {
            let condition = self.simplify(&case.condition, scope)?;
            let Some(known) = condition.as_value().map(Value::is_truthy) else {
                let body = self.simplify(&case.body, scope)?;
                kept.push(IfCase { condition, body });
                continue;
            };
            if !known {
                continue;
            }
            let body = self.simplify(&case.body, scope)?;
            if kept.is_empty() {
                return Ok(body);
            }
            kept.push(IfCase {
                condition: Expr::value(true, condition.origin),
                body,
            });
            break;
        }
        if kept.is_empty() {
            return Ok(Expr::value(Value::None, origin.clone()));
        }
        Ok(Expr::new(ExprKind::If(kept), origin.clone()))
    }

    /// A loop over a known iterable unrolls into one body per item.
    pub(super) fn for_each(
        self,
        names: &Names,
        iterable: &Expr,
        body: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let iterable = self.simplify(iterable, scope)?;
        let body = self.simplify(body, &scope.without(names))?;
        let Some(items) = iterable.as_value() else {
            return Ok(Expr::for_each(names.clone(), iterable, body, origin.clone()));
        };

        let items = iterate(items)?;
        tracing::trace!(items = items.len(), "unrolling for");
        let mut unrolled = Vec::with_capacity(items.len());
        for item in &items {
            let bound = destructure(names, item)?;
            unrolled.push(self.simplify(&body, &Scope::new(&bound))?);
        }
        Ok(match resolved(&unrolled) {
            Some(values) => Expr::value(values, origin.clone()),
            None => Expr::new(ExprKind::List(unrolled), origin.clone()),
        })
    }

    /// Bindings whose value resolves are substituted and dropped. The body
    /// alone remains once no binding is left or it no longer needs any.
    pub(super) fn with(
        self,
        bindings: &[Binding],
        body: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> SimplifyResult {
        let mut seen = BTreeSet::new();
        for name in bindings.iter().flat_map(|b| b.names.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(duplicate_binding(name));
            }
        }

        let mut hidden: Vec<String> = Vec::new();
        let mut bound = Variables::default();
        let mut remaining = Vec::new();
        for binding in bindings {
            let value = self.simplify(&binding.value, &scope.without(&hidden))?;
            let value = self.simplify(&value, &Scope::new(&bound))?;
            match value.as_value() {
                Some(v) => destructure_into(&mut bound, &binding.names, v)?,
                None => remaining.push(Binding {
                    names: binding.names.clone(),
                    value,
                }),
            }
            hidden.extend(binding.names.iter().cloned());
        }

        let body = self.simplify(body, &scope.without(&hidden))?;
        let body = self.simplify(&body, &Scope::new(&bound))?;
        if remaining.is_empty() || is_closed(&body) {
            return Ok(body);
        }
        Ok(Expr::with(remaining, body, origin.clone()))
    }
}
