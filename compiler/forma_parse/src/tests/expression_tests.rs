#![allow(clippy::unwrap_used, clippy::expect_used)]

use forma_ir::{BinaryOp, Builtin, Expr, ExprKind, Origin, UnaryOp, Value};
use pretty_assertions::assert_eq;

use crate::{expression, parse_expression, ParseContext, ParseError, ParseResult};

use BinaryOp::*;

fn parse(source: &str) -> Expr {
    match parse_expression(source) {
        Ok(expr) => expr,
        Err(e) => panic!("failed to parse {source:?}:\n{e}"),
    }
}

fn id(name: &str) -> Expr {
    Expr::identifier(name, Origin::synthetic())
}

fn val(value: impl Into<Value>) -> Expr {
    Expr::value(value, Origin::synthetic())
}

fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs, Origin::synthetic())
}

fn un(op: UnaryOp, operand: Expr) -> Expr {
    Expr::unary(op, operand, Origin::synthetic())
}

fn call(callee: Expr, args: Vec<Expr>, kwargs: Vec<(&str, Expr)>) -> Expr {
    let kwargs = kwargs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    Expr::call(callee, args, kwargs, Origin::synthetic())
}

fn slice(start: Expr, stop: Expr, step: Expr) -> Expr {
    call(val(Builtin::slice()), vec![start, stop, step], vec![])
}

// === precedence ===

#[test]
fn product_binds_tighter_than_sum() {
    assert_eq!(parse("a + b * c"), bin(Add, id("a"), bin(Mul, id("b"), id("c"))));
    assert_eq!(
        parse("a * b + c / d"),
        bin(Add, bin(Mul, id("a"), id("b")), bin(Div, id("c"), id("d")))
    );
    assert_eq!(
        parse("a + b * c - d"),
        bin(Sub, bin(Add, id("a"), bin(Mul, id("b"), id("c"))), id("d"))
    );
}

#[test]
fn full_precedence_ladder() {
    let expected = bin(
        Or,
        bin(And, id("a"), id("b")),
        bin(
            In,
            id("c"),
            bin(
                BitOr,
                bin(
                    BitXor,
                    bin(Pow, id("d"), id("e")),
                    bin(
                        BitAnd,
                        id("f"),
                        bin(Shl, id("g"), bin(Add, id("h"), bin(Mul, id("i"), id("j")))),
                    ),
                ),
                id("k"),
            ),
        ),
    );
    assert_eq!(
        parse("a and b or c in d ** e ^ f & g << h + i * j | k"),
        expected
    );
}

#[test]
fn operators_sharing_a_prefix() {
    assert_eq!(parse("a // b"), bin(FloorDiv, id("a"), id("b")));
    assert_eq!(parse("a<<b"), bin(Shl, id("a"), id("b")));
    assert_eq!(parse("a <= b"), bin(LtEq, id("a"), id("b")));
    assert_eq!(parse("a ** b * c"), bin(Mul, bin(Pow, id("a"), id("b")), id("c")));
    assert_eq!(parse("a not in b"), bin(NotIn, id("a"), id("b")));
    assert_eq!(parse("a @ b"), bin(MatMul, id("a"), id("b")));
}

#[test]
fn unary_operators() {
    assert_eq!(parse("-x ** 2"), un(UnaryOp::Neg, bin(Pow, id("x"), val(2))));
    assert_eq!(parse("2 ** -1"), bin(Pow, val(2), un(UnaryOp::Neg, val(1))));
    assert_eq!(parse("~ +1"), un(UnaryOp::Invert, un(UnaryOp::Pos, val(1))));
    assert_eq!(
        parse("not a == b"),
        un(UnaryOp::Not, bin(Eq, id("a"), id("b")))
    );
    assert_eq!(
        parse("not not a"),
        un(UnaryOp::Not, un(UnaryOp::Not, id("a")))
    );
}

#[test]
fn chained_comparison_desugars_to_conjunction() {
    assert_eq!(
        parse("a<b<=c"),
        bin(And, bin(Lt, id("a"), id("b")), bin(LtEq, id("b"), id("c")))
    );
    assert_eq!(
        parse("1<a<=b==2"),
        bin(
            And,
            bin(And, bin(Lt, val(1), id("a")), bin(LtEq, id("a"), id("b"))),
            bin(Eq, id("b"), val(2)),
        )
    );
}

// === literals ===

#[test]
fn integer_literals() {
    assert_eq!(parse("42"), val(42));
    assert_eq!(parse("1_000"), val(1000));
    assert_eq!(parse("0x1F"), val(31));
    assert_eq!(parse("0b101"), val(5));
    assert_eq!(parse("0O17"), val(15));
    assert!(parse_expression("99999999999999999999").is_err());
}

#[test]
fn float_literals() {
    assert_eq!(parse("1.5"), val(1.5));
    assert_eq!(parse("1."), val(1.0));
    assert_eq!(parse("2e3"), val(2000.0));
    assert_eq!(parse("1_0.2_5e-1"), val(1.025));
}

#[test]
fn string_literals() {
    assert_eq!(parse("'foo '"), val("foo "));
    assert_eq!(parse("\"it's\""), val("it's"));
    assert_eq!(parse(r#"'a\nb\t\'\\'"#), val("a\nb\t'\\"));
    assert_eq!(parse(r"'\x41\u{e9}'"), val("Aé"));
    assert!(parse_expression("\"foo").is_err());
    assert!(parse_expression(r"'\q'").is_err());
}

#[test]
fn constants_and_identifiers() {
    assert_eq!(parse("True"), val(true));
    assert_eq!(parse("False"), val(false));
    assert_eq!(parse("None"), val(Value::None));
    assert_eq!(parse("Truex"), id("Truex"));
    assert_eq!(parse("android"), id("android"));
    assert!(parse_expression("and").is_err());
    assert!(parse_expression("lambda").is_err());
}

// === postfix ===

#[test]
fn calls_with_keyword_arguments() {
    assert_eq!(
        parse("f(1, x=2,)"),
        call(id("f"), vec![val(1)], vec![("x", val(2))])
    );
    assert_eq!(parse("f()"), call(id("f"), vec![], vec![]));
    assert_eq!(
        parse("f(a == b)"),
        call(id("f"), vec![bin(Eq, id("a"), id("b"))], vec![])
    );
}

#[test]
fn positional_after_keyword_is_rejected() {
    assert!(parse_expression("f(x=1, 2)").is_err());
    assert!(parse_expression("f(x=1, x=2)").is_err());
}

#[test]
fn postfix_chain_folds_left() {
    let expected = call(
        Expr::index(
            Expr::attribute(id("a"), "b", Origin::synthetic()),
            val(0),
            Origin::synthetic(),
        ),
        vec![id("c")],
        vec![],
    );
    assert_eq!(parse("a.b[0](c)"), expected);
}

#[test]
fn slices_call_the_slice_intrinsic() {
    let none = || val(Value::None);
    assert_eq!(
        parse("a[1:]"),
        Expr::index(id("a"), slice(val(1), none(), none()), Origin::synthetic())
    );
    assert_eq!(
        parse("a[::2]"),
        Expr::index(id("a"), slice(none(), none(), val(2)), Origin::synthetic())
    );
    assert_eq!(
        parse("a[x:y:z]"),
        Expr::index(id("a"), slice(id("x"), id("y"), id("z")), Origin::synthetic())
    );
}

// === collections and lambdas ===

#[test]
fn list_and_dict_literals() {
    assert_eq!(
        parse("[1, 'a',]"),
        Expr::new(ExprKind::List(vec![val(1), val("a")]), Origin::synthetic())
    );
    assert_eq!(
        parse("{1: True, 'k': x}"),
        Expr::new(
            ExprKind::Dict(vec![(val(1), val(true)), (val("k"), id("x"))]),
            Origin::synthetic()
        )
    );
    assert_eq!(parse("[]"), Expr::new(ExprKind::List(vec![]), Origin::synthetic()));
}

#[test]
fn lambda_expressions() {
    let params = ["x".to_string(), "y".to_string()].into_iter().collect();
    assert_eq!(
        parse("lambda x, y: x + y"),
        Expr::lambda(params, bin(Add, id("x"), id("y")), Origin::synthetic())
    );
    assert_eq!(
        parse("lambda: 1"),
        Expr::lambda(Default::default(), val(1), Origin::synthetic())
    );
    assert!(parse_expression("lambda x, x: x").is_err());
}

// === positions and errors ===

#[test]
fn expression_leaves_trailing_input() {
    let result = expression().parse(&ParseContext::new("foo bar"));
    let ParseResult::Success(s) = result else {
        panic!("expected success");
    };
    assert_eq!(s.value, id("foo"));
    assert_eq!(s.cursor.index(), 3);
}

#[test]
fn origins_follow_the_source() {
    let expr = parse("a +\n  b");
    let ExprKind::Binary { lhs, rhs, .. } = &expr.kind else {
        panic!("expected a binary node, got {expr:?}");
    };
    assert_eq!((lhs.origin.line, lhs.origin.column), (1, 1));
    assert_eq!((rhs.origin.line, rhs.origin.column), (2, 3));

    let expr = parse("  x");
    assert_eq!(expr.origin.column, 3);
}

#[test]
fn excess_content_is_reported_where_parsing_stopped() {
    let error = parse_expression("1 +").unwrap_err();
    assert!(matches!(error, ParseError::ExcessContent(_)));
    assert_eq!(error.line_column(), (1, 3));

    let error = parse_expression("").unwrap_err();
    assert!(matches!(error, ParseError::Mismatch(_)));
}

#[test]
fn display_is_source_like() {
    assert_eq!(parse("a+b*c").to_string(), "(a + (b * c))");
    assert_eq!(parse("f('s', k=None)").to_string(), "f('s', k=None)");
}
