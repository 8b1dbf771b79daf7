use super::*;
use crate::origin::Origin;
use crate::value::Value;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn at(line: u32, column: u32) -> Origin {
    Origin::new(line, column, "test")
}

#[test]
fn equality_ignores_origin() {
    let a = Expr::identifier("foo", at(1, 1));
    let b = Expr::identifier("foo", at(7, 12));
    assert_eq!(a, b);
    assert_ne!(a, Expr::identifier("bar", at(1, 1)));
}

#[test]
fn nested_equality_ignores_origin() {
    let lhs = Expr::binary(
        BinaryOp::Add,
        Expr::identifier("a", at(1, 1)),
        Expr::value(1, at(1, 5)),
        at(1, 1),
    );
    let rhs = Expr::binary(
        BinaryOp::Add,
        Expr::identifier("a", at(3, 3)),
        Expr::value(1, at(9, 9)),
        at(2, 2),
    );
    assert_eq!(lhs, rhs);
}

#[test]
fn into_value_returns_leaf_or_node() {
    assert_eq!(Expr::value(42, at(1, 1)).into_value(), Ok(Value::Int(42)));
    let node = Expr::identifier("x", at(1, 1));
    assert_eq!(node.clone().into_value(), Err(node));
}

#[test]
fn binary_symbols_round_trip() {
    for op in BinaryOp::ALL {
        assert_eq!(BinaryOp::from_symbol(op.as_symbol()), Some(op));
    }
    assert_eq!(BinaryOp::from_symbol("&&"), None);
}

#[test]
fn unary_symbols_round_trip() {
    for op in [UnaryOp::Pos, UnaryOp::Neg, UnaryOp::Invert, UnaryOp::Not] {
        assert_eq!(UnaryOp::from_symbol(op.as_symbol()), Some(op));
    }
}

#[test]
fn comparison_classification() {
    assert!(BinaryOp::LtEq.is_comparison());
    assert!(!BinaryOp::In.is_comparison());
    assert!(BinaryOp::NotIn.is_word());
    assert!(BinaryOp::Or.is_short_circuit());
}

#[test]
fn display_parenthesizes_operators() {
    let expr = Expr::binary(
        BinaryOp::Add,
        Expr::identifier("a", at(1, 1)),
        Expr::binary(
            BinaryOp::Mul,
            Expr::value(1, at(1, 1)),
            Expr::identifier("c", at(1, 1)),
            at(1, 1),
        ),
        at(1, 1),
    );
    assert_eq!(expr.to_string(), "(a + (1 * c))");

    let lambda = Expr::lambda(
        smallvec!["x".to_string(), "y".to_string()],
        Expr::unary(UnaryOp::Not, Expr::identifier("x", at(1, 1)), at(1, 1)),
        at(1, 1),
    );
    assert_eq!(lambda.to_string(), "(lambda x, y: (not x))");
}

#[test]
fn display_calls_and_collections() {
    let call = Expr::call(
        Expr::identifier("f", at(1, 1)),
        vec![Expr::value("s", at(1, 1))],
        vec![("k".to_string(), Expr::value(Value::None, at(1, 1)))],
        at(1, 1),
    );
    assert_eq!(call.to_string(), "f('s', k=None)");

    let dict = Expr::new(
        ExprKind::Dict(vec![(Expr::value(1, at(1, 1)), Expr::value(true, at(1, 1)))]),
        at(1, 1),
    );
    assert_eq!(dict.to_string(), "{1: True}");
}
