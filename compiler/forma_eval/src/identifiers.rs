//! Free-identifier discovery.
//!
//! The free identifiers of a node are those of its children, minus the names
//! the node binds itself: lambda parameters, `for` names over the body, and
//! `with` names over later bindings and the body.

use std::collections::BTreeSet;

use forma_ir::{Expr, ExprKind};
use forma_stack::ensure_sufficient_stack;

/// Names referenced by `expr` that no enclosing construct binds, sorted.
pub fn identifiers(expr: &Expr) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect(expr, &mut Vec::new(), &mut names);
    names
}

/// Whether `expr` has no free identifiers.
pub fn is_closed(expr: &Expr) -> bool {
    identifiers(expr).is_empty()
}

/// Walk `expr`, recording identifiers not in `bound`.
///
/// `bound` is used as a stack: each binding construct pushes its names,
/// recurses, then truncates back.
fn collect<'e>(expr: &'e Expr, bound: &mut Vec<&'e str>, out: &mut BTreeSet<String>) {
    ensure_sufficient_stack(|| match &expr.kind {
        ExprKind::Value(_) => {}
        ExprKind::Identifier(name) => {
            if !bound.contains(&name.as_str()) {
                out.insert(name.clone());
            }
        }
        ExprKind::Unary { operand, .. } => collect(operand, bound, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect(lhs, bound, out);
            collect(rhs, bound, out);
        }
        ExprKind::Index { base, index } => {
            collect(base, bound, out);
            collect(index, bound, out);
        }
        ExprKind::Call {
            callee,
            args,
            kwargs,
        } => {
            collect(callee, bound, out);
            for arg in args {
                collect(arg, bound, out);
            }
            for (_, arg) in kwargs {
                collect(arg, bound, out);
            }
        }
        ExprKind::Attribute { object, .. } => collect(object, bound, out),
        ExprKind::List(items) | ExprKind::Template(items) => {
            for item in items {
                collect(item, bound, out);
            }
        }
        ExprKind::Dict(entries) => {
            for (k, v) in entries {
                collect(k, bound, out);
                collect(v, bound, out);
            }
        }
        ExprKind::Lambda { params, body } => {
            let mark = bound.len();
            bound.extend(params.iter().map(String::as_str));
            collect(body, bound, out);
            bound.truncate(mark);
        }
        ExprKind::If(cases) => {
            for case in cases {
                collect(&case.condition, bound, out);
                collect(&case.body, bound, out);
            }
        }
        ExprKind::For {
            names,
            iterable,
            body,
        } => {
            collect(iterable, bound, out);
            let mark = bound.len();
            bound.extend(names.iter().map(String::as_str));
            collect(body, bound, out);
            bound.truncate(mark);
        }
        ExprKind::With { bindings, body } => {
            let mark = bound.len();
            for binding in bindings {
                collect(&binding.value, bound, out);
                bound.extend(binding.names.iter().map(String::as_str));
            }
            collect(body, bound, out);
            bound.truncate(mark);
        }
    });
}
