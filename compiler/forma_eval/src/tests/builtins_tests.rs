#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use forma_ir::{Closure, Expr, ExprKind, Origin, Value, ValueKind};
use pretty_assertions::assert_eq;

use crate::builtins::default_variables;
use crate::errors::{EvalError, EvalErrorKind};
use crate::methods::call_value;
use crate::renderers::{RenderKey, Renderers};

fn call_with(name: &str, args: &[Value], kwargs: &[(&str, Value)]) -> Result<Value, EvalError> {
    let globals = default_variables();
    let f = globals
        .get(name)
        .unwrap_or_else(|| panic!("no builtin {name}"));
    let kwargs: Vec<_> = kwargs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    call_value(f, args, &kwargs, &Renderers::default())
}

fn call(name: &str, args: &[Value]) -> Value {
    call_with(name, args, &[]).unwrap()
}

fn ints(items: &[i64]) -> Value {
    Value::list(items.iter().copied().map(Value::Int))
}

#[test]
fn every_builtin_is_registered() {
    let globals = default_variables();
    for name in [
        "len", "min", "max", "abs", "sum", "range", "sorted", "str", "int", "float", "bool",
        "enumerate", "zip",
    ] {
        assert!(globals.contains_key(name), "missing {name}");
    }
}

#[test]
fn len_counts_characters_items_and_entries() {
    assert_eq!(call("len", &[Value::from("héllo")]), Value::Int(5));
    assert_eq!(call("len", &[ints(&[1, 2])]), Value::Int(2));
    assert!(call_with("len", &[Value::Int(1)], &[]).is_err());
}

#[test]
fn min_and_max() {
    assert_eq!(call("min", &[ints(&[3, 1, 2])]), Value::Int(1));
    assert_eq!(call("max", &[Value::Int(3), Value::Int(7)]), Value::Int(7));
    assert_eq!(
        call_with("max", &[ints(&[])], &[("default", Value::None)]).unwrap(),
        Value::None
    );
    assert!(call_with("min", &[ints(&[])], &[]).is_err());
}

#[test]
fn abs_and_sum() {
    assert_eq!(call("abs", &[Value::Int(-4)]), Value::Int(4));
    assert_eq!(call("sum", &[ints(&[1, 2, 3])]), Value::Int(6));
    assert_eq!(call("sum", &[ints(&[1, 2]), Value::Int(10)]), Value::Int(13));
    assert!(call_with("abs", &[Value::Int(i64::MIN)], &[]).is_err());
}

#[test]
fn range_forms() {
    assert_eq!(call("range", &[Value::Int(3)]), ints(&[0, 1, 2]));
    assert_eq!(call("range", &[Value::Int(1), Value::Int(4)]), ints(&[1, 2, 3]));
    assert_eq!(
        call("range", &[Value::Int(5), Value::Int(0), Value::Int(-2)]),
        ints(&[5, 3, 1])
    );
    assert!(call_with("range", &[Value::Int(0), Value::Int(1), Value::Int(0)], &[]).is_err());
}

#[test]
fn sorted_with_key_and_reverse() {
    assert_eq!(call("sorted", &[ints(&[3, 1, 2])]), ints(&[1, 2, 3]));
    assert_eq!(
        call_with("sorted", &[ints(&[3, 1, 2])], &[("reverse", Value::Bool(true))]).unwrap(),
        ints(&[3, 2, 1])
    );
    let words = Value::list(["ccc", "a", "bb"].map(Value::from));
    let by_len = default_variables()["len"].clone();
    assert_eq!(
        call_with("sorted", &[words], &[("key", by_len)]).unwrap(),
        Value::list(["a", "bb", "ccc"].map(Value::from))
    );
}

/// `lambda x: <template splicing x>`, so the key depends on the renderers.
fn rendered_key() -> Value {
    let origin = Origin::synthetic();
    let body = Expr::new(
        ExprKind::Template(vec![Expr::identifier("x", origin.clone())]),
        origin,
    );
    Value::Lambda(Arc::new(Closure {
        params: ["x".to_string()].into_iter().collect(),
        body,
    }))
}

#[test]
fn key_functions_render_with_the_callers_renderers() {
    let args = [ints(&[10, 9])];
    let kwargs = [("key".to_string(), rendered_key())];
    let globals = default_variables();
    let sorted = &globals["sorted"];

    // Plain text keys compare "10" < "9".
    let plain = call_value(sorted, &args, &kwargs, &Renderers::default()).unwrap();
    assert_eq!(plain, ints(&[10, 9]));

    let padded = Renderers::empty().with(RenderKey::Exact(ValueKind::Int), |v| {
        format!("{:0>3}", v.as_int().unwrap_or_default())
    });
    assert_eq!(call_value(sorted, &args, &kwargs, &padded).unwrap(), ints(&[9, 10]));
    assert_eq!(
        call_value(&globals["max"], &[Value::Int(10), Value::Int(9)], &kwargs, &padded).unwrap(),
        Value::Int(10)
    );

    let err = call_value(sorted, &args, &kwargs, &Renderers::empty()).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingRenderer {
            type_name: "int".to_string()
        }
    );
}

#[test]
fn sorting_incomparable_items_fails() {
    let mixed = Value::list([Value::Int(1), Value::from("a")]);
    assert!(call_with("sorted", &[mixed], &[]).is_err());
}

#[test]
fn conversions() {
    assert_eq!(call("str", &[Value::Float(1.0)]), Value::from("1.0"));
    assert_eq!(call("str", &[Value::None]), Value::from("None"));
    assert_eq!(call("int", &[Value::from(" 1_000 ")]), Value::Int(1000));
    assert_eq!(call("int", &[Value::Float(-2.7)]), Value::Int(-2));
    assert_eq!(call("float", &[Value::from("2.5")]), Value::Float(2.5));
    assert_eq!(call("bool", &[Value::from("")]), Value::Bool(false));
    assert_eq!(call("bool", &[]), Value::Bool(false));

    let err = call_with("int", &[Value::from("x")], &[]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::BadArgument { ref name, .. } if name == "int"));
}

#[test]
fn enumerate_and_zip() {
    assert_eq!(
        call_with("enumerate", &[Value::from("ab")], &[("start", Value::Int(1))]).unwrap(),
        Value::list([
            Value::list([Value::Int(1), Value::from("a")]),
            Value::list([Value::Int(2), Value::from("b")]),
        ])
    );
    assert_eq!(
        call("zip", &[ints(&[1, 2, 3]), Value::from("ab")]),
        Value::list([
            Value::list([Value::Int(1), Value::from("a")]),
            Value::list([Value::Int(2), Value::from("b")]),
        ])
    );
}

#[test]
fn unknown_keyword_is_reported() {
    let err = call_with("len", &[Value::from("a")], &[("bogus", Value::None)]).unwrap_err();
    assert!(err.message.contains("bogus"));
}
