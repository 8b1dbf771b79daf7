//! Property-based tests for partial evaluation.
//!
//! Random expression trees over a few integer variables check that
//! simplification is idempotent, only ever removes free identifiers, and
//! agrees with full evaluation whenever nothing is left unresolved.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;

use forma_eval::{evaluate, identifiers, simplify, Renderers, Variables};
use forma_ir::{BinaryOp, Binding, Expr, ExprKind, IfCase, Names, Origin, UnaryOp, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const NAMES: [&str; 4] = ["a", "b", "c", "x"];

fn origin() -> Origin {
    Origin::synthetic()
}

fn one_name(name: &str) -> Names {
    std::iter::once(name.to_string()).collect()
}

fn arb_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES.to_vec())
}

fn arb_leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (-4i64..5).prop_map(|n| Expr::value(n, origin())),
        any::<bool>().prop_map(|b| Expr::value(b, origin())),
        arb_name().prop_map(|name| Expr::identifier(name, origin())),
    ]
}

fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    prop::sample::select(vec![
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::FloorDiv,
        BinaryOp::Mod,
        BinaryOp::Lt,
        BinaryOp::Eq,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::BitXor,
    ])
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    arb_leaf().prop_recursive(4, 48, 3, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec![UnaryOp::Neg, UnaryOp::Not]),
                inner.clone()
            )
                .prop_map(|(op, operand)| Expr::unary(op, operand, origin())),
            (arb_binary_op(), inner.clone(), inner.clone())
                .prop_map(|(op, lhs, rhs)| Expr::binary(op, lhs, rhs, origin())),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|items| Expr::new(ExprKind::List(items), origin())),
            prop::collection::vec((inner.clone(), inner.clone()), 1..3).prop_map(|cases| {
                let cases = cases
                    .into_iter()
                    .map(|(condition, body)| IfCase { condition, body })
                    .collect();
                Expr::new(ExprKind::If(cases), origin())
            }),
            (
                arb_name(),
                prop::collection::vec(inner.clone(), 0..3),
                inner.clone()
            )
                .prop_map(|(name, items, body)| {
                    let iterable = Expr::new(ExprKind::List(items), origin());
                    Expr::for_each(one_name(name), iterable, body, origin())
                }),
            (arb_name(), inner.clone(), inner.clone()).prop_map(|(name, value, body)| {
                let binding = Binding {
                    names: one_name(name),
                    value,
                };
                Expr::with(vec![binding], body, origin())
            }),
            (arb_name(), inner.clone(), inner).prop_map(|(name, body, arg)| {
                let lambda = Expr::lambda(one_name(name), body, origin());
                Expr::call(lambda, vec![arg], Vec::new(), origin())
            }),
        ]
    })
}

fn arb_variables() -> impl Strategy<Value = Variables> {
    prop::collection::vec(prop::option::of(-4i64..5), NAMES.len()).prop_map(|values| {
        NAMES
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| ((*name).to_string(), Value::Int(v))))
            .collect()
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn simplify_is_idempotent(expr in arb_expr(), vars in arb_variables()) {
        let renderers = Renderers::default();
        if let Ok(once) = simplify(&expr, &vars, &renderers) {
            let twice = simplify(&once, &vars, &renderers);
            prop_assert_eq!(twice.as_ref(), Ok(&once));
        }
    }

    #[test]
    fn simplify_only_removes_identifiers(expr in arb_expr(), vars in arb_variables()) {
        if let Ok(simplified) = simplify(&expr, &vars, &Renderers::default()) {
            let allowed: BTreeSet<String> = identifiers(&expr)
                .into_iter()
                .filter(|name| !vars.contains_key(name))
                .collect();
            let remaining = identifiers(&simplified);
            prop_assert!(
                remaining.is_subset(&allowed),
                "{remaining:?} not within {allowed:?} for {expr}"
            );
        }
    }

    #[test]
    fn closed_result_agrees_with_evaluate(expr in arb_expr(), vars in arb_variables()) {
        let renderers = Renderers::default();
        if let Ok(simplified) = simplify(&expr, &vars, &renderers) {
            if identifiers(&simplified).is_empty() {
                let value = simplified.as_value().cloned();
                prop_assert!(value.is_some(), "closed but unresolved: {simplified}");
                prop_assert_eq!(evaluate(&expr, &vars, &renderers).ok(), value);
            }
        }
    }

    #[test]
    fn evaluate_reports_unresolved_names(expr in arb_expr(), vars in arb_variables()) {
        let renderers = Renderers::default();
        if let Ok(simplified) = simplify(&expr, &vars, &renderers) {
            let remaining = identifiers(&simplified);
            if !remaining.is_empty() {
                let err = evaluate(&expr, &vars, &renderers).unwrap_err();
                prop_assert_eq!(err.unresolved_names(), Some(&remaining));
            }
        }
    }
}
