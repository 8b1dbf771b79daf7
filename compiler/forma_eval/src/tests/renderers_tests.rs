#![allow(clippy::unwrap_used, clippy::expect_used)]

use forma_ir::{HostObject, Value, ValueKind};
use pretty_assertions::assert_eq;

use crate::errors::EvalErrorKind;
use crate::renderers::{RenderKey, Renderers};

#[test]
fn defaults_render_strings_and_numbers_only() {
    let renderers = Renderers::default();
    assert_eq!(renderers.render(&Value::from("a")).unwrap(), "a");
    assert_eq!(renderers.render(&Value::Int(7)).unwrap(), "7");
    assert_eq!(renderers.render(&Value::Float(0.5)).unwrap(), "0.5");

    let err = renderers.render(&Value::Bool(true)).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingRenderer {
            type_name: "bool".to_string()
        }
    );
    assert!(renderers.render(&Value::None).is_err());
}

#[test]
fn exact_key_beats_kind_key() {
    let renderers = Renderers::empty()
        .with(RenderKey::Kind(ValueKind::Int), |_| "kind".to_string())
        .with(RenderKey::Exact(ValueKind::Bool), |_| "exact".to_string());
    assert_eq!(renderers.render(&Value::Bool(true)).unwrap(), "exact");
}

#[test]
fn kind_key_covers_specializations() {
    let renderers = Renderers::empty().with(RenderKey::Kind(ValueKind::Int), |v| format!("#{v}"));
    assert_eq!(renderers.render(&Value::Int(2)).unwrap(), "#2");
    assert_eq!(renderers.render(&Value::Bool(false)).unwrap(), "#False");
    assert!(renderers.render(&Value::Float(1.0)).is_err());
}

#[test]
fn own_kind_beats_parent_kind() {
    let renderers = Renderers::empty()
        .with(RenderKey::Kind(ValueKind::Int), |_| "int".to_string())
        .with(RenderKey::Kind(ValueKind::Bool), |_| "bool".to_string());
    assert_eq!(renderers.render(&Value::Bool(true)).unwrap(), "bool");
}

#[test]
fn first_declared_wins_ties_and_any_is_last_resort() {
    let renderers = Renderers::empty()
        .with(RenderKey::Any, |_| "any".to_string())
        .with(RenderKey::Exact(ValueKind::Str), |_| "first".to_string())
        .with(RenderKey::Exact(ValueKind::Str), |_| "second".to_string());
    assert_eq!(renderers.render(&Value::from("x")).unwrap(), "first");
    assert_eq!(renderers.render(&Value::None).unwrap(), "any");
    assert_eq!(renderers.len(), 3);
}

#[derive(Debug)]
struct Money(i64);

impl HostObject for Money {
    fn type_name(&self) -> &str {
        "Money"
    }

    fn to_text(&self) -> Option<String> {
        Some(format!("{}.{:02}", self.0 / 100, self.0 % 100))
    }
}

#[test]
fn host_key_matches_type_name() {
    let renderers = Renderers::default()
        .with_display(RenderKey::Host("Money".into()))
        .with(RenderKey::Host("Other".into()), |_| "wrong".to_string());
    assert_eq!(renderers.render(&Value::host(Money(1234))).unwrap(), "12.34");
}
