//! Parsing, substitution and rendering through `Template`.

use std::collections::BTreeSet;

use forma::{
    default_variables, evaluate, EvalErrorKind, HostObject, RenderKey, Renderers, Segment,
    Template, TemplateSyntaxConfig, Value, ValueKind, Variables,
};
use forma_ir::{BinaryOp, NativeError, NativeResult};
use pretty_assertions::assert_eq;

use crate::common::{expr, expression, parse, text, vars, with_bool};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn substitute(source: &str, variables: &Variables) -> Vec<Segment> {
    parse(source)
        .substitute(variables, true, &Renderers::default())
        .unwrap()
        .segments()
        .to_vec()
}

fn render(source: &str, variables: &Variables) -> String {
    parse(source).render(variables, &Renderers::default()).unwrap()
}

fn render_all(source: &str, variables: &[(&str, Value)]) -> String {
    let mut all = default_variables();
    all.extend(vars(variables));
    parse(source).render(&all, &with_bool()).unwrap()
}

// === identifiers ===

#[test]
fn identifiers_come_from_expressions_only() {
    assert_eq!(parse("").identifiers(), set(&[]));
    assert_eq!(parse("foo").identifiers(), set(&[]));
    assert_eq!(parse("foo{{bar}}").identifiers(), set(&["bar"]));
    assert_eq!(parse("{{foo}}{{bar}}").identifiers(), set(&["foo", "bar"]));
    assert_eq!(parse("{#foo#}{{bar}}").identifiers(), set(&["bar"]));
    assert_eq!(parse("{{'bar'}}").identifiers(), set(&[]));
    assert_eq!(parse("{{+-~bar}}").identifiers(), set(&["bar"]));
    assert_eq!(
        parse("{{a[b][c:d:e]}}").identifiers(),
        set(&["a", "b", "c", "d", "e"])
    );
    assert_eq!(
        parse("{% for x in xs %}{{x}}{{y}}{% endfor %}").identifiers(),
        set(&["xs", "y"])
    );
}

// === substitute ===

#[test]
fn substitute_keeps_unresolved_expressions() {
    assert_eq!(substitute("", &vars(&[])), Vec::<Segment>::new());
    assert_eq!(substitute("foo", &vars(&[])), vec![text("foo")]);
    assert_eq!(
        substitute("foo{{bar}}", &vars(&[])),
        vec![text("foo"), expr("bar")]
    );
    assert_eq!(
        substitute("{{a}}{{b}}", &vars(&[("a", Value::Int(42))])),
        vec![text("42"), expr("b")]
    );
}

#[test]
fn substitute_merges_text_and_drops_empty_text() {
    assert_eq!(
        substitute("foo{{bar}}", &vars(&[("bar", Value::from(""))])),
        vec![text("foo")]
    );
    assert_eq!(
        substitute("{{foo}}bar", &vars(&[("foo", Value::from(""))])),
        vec![text("bar")]
    );
    assert_eq!(
        substitute(
            "{{foo}}{{bar}}",
            &vars(&[("foo", Value::Int(42)), ("bar", Value::from("y"))])
        ),
        vec![text("42y")]
    );
    assert_eq!(
        substitute("a{% literal %}{{ raw }}{# no #}{% endliteral %}b", &vars(&[])),
        vec![text("a{{ raw }}{# no #}b")]
    );
}

#[test]
fn comments_are_kept_on_request() {
    let template = parse("{#foo#}{{b}}");
    let b = vars(&[("b", Value::Int(42))]);
    let renderers = Renderers::default();
    assert_eq!(
        template.substitute(&b, true, &renderers).unwrap().segments(),
        &[Segment::Comment("foo".to_string()), text("42")]
    );
    assert_eq!(
        template.substitute(&b, false, &renderers).unwrap().segments(),
        &[text("42")]
    );
}

#[test]
fn substitute_reduces_partially_known_expressions() {
    assert_eq!(
        substitute("{{-a+b}}", &vars(&[("b", Value::Int(1))])),
        vec![expr("-a + 1")]
    );
    assert_eq!(
        substitute("{{a+b*c}}", &vars(&[("b", Value::Int(1))])),
        vec![expr("a + 1 * c")]
    );
}

#[test]
fn substituting_twice_changes_nothing() {
    let variables = vars(&[("b", Value::Int(2))]);
    let renderers = Renderers::default();
    let once = parse("x{{a + b}}y{{b * 3}}z")
        .substitute(&variables, true, &renderers)
        .unwrap();
    let twice = once.substitute(&variables, true, &renderers).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.segments(), &[text("x"), expr("a + 2"), text("y6z")]);
}

#[test]
fn renderers_pick_the_text() {
    let none = vars(&[("bar", Value::None)]);
    let err = parse("{#foo#}{{bar}}")
        .substitute(&none, false, &Renderers::default())
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingRenderer {
            type_name: "NoneType".to_string()
        }
    );

    let renderers = Renderers::default().with_display(RenderKey::Exact(ValueKind::None));
    assert_eq!(parse("{{bar}}").render(&none, &renderers).unwrap(), "None");

    let shouting =
        Renderers::default().with(RenderKey::Exact(ValueKind::Int), |v| format!("<{v}>"));
    assert_eq!(
        parse("n={{n}}").render(&vars(&[("n", Value::Int(3))]), &shouting).unwrap(),
        "n=<3>"
    );
}

// === render ===

#[test]
fn arithmetic_end_to_end() {
    let abc = vars(&[
        ("a", Value::Int(1)),
        ("b", Value::Int(2)),
        ("c", Value::Int(3)),
    ]);
    assert_eq!(render("{{a+b*c}}", &abc), "7");
    assert_eq!(render("{{a/b}}", &abc), "0.5");
    assert_eq!(render("{{c//b}} {{c%b}} {{c**b}}", &abc), "1 1 9");
    assert_eq!(render("{{~a}} {{a<<c}} {{c&b}} {{a|b}} {{a^c}}", &abc), "-2 8 2 3 2");
    assert_eq!(render("{{'fo' + 'o'}}", &abc), "foo");
}

#[test]
fn render_reports_only_the_missing_names() {
    let err = parse("{{foo}}{{bar}}")
        .render(&vars(&[("foo", Value::Int(1))]), &Renderers::default())
        .unwrap_err();
    assert!(err.is_unresolved());
    assert_eq!(err.unresolved_names(), Some(&set(&["bar"])));
    assert!(err.to_string().contains("bar"));
}

#[test]
fn chained_comparisons_and_booleans() {
    let ab = [("a", Value::Int(2)), ("b", Value::Int(2))];
    assert_eq!(render_all("{{1<a<=b==2}}", &ab), "True");
    assert_eq!(render_all("{{1>a>=b!=2}}", &ab), "False");
    assert_eq!(render_all("{{a in [1, 2]}} {{a not in []}}", &ab), "True True");
    assert_eq!(
        render_all("{{x and y}} {{x or y}} {{not x}}", &[
            ("x", Value::Bool(true)),
            ("y", Value::Bool(false)),
        ]),
        "False True False"
    );
}

#[test]
fn nested_comments_render_nothing() {
    let template = parse("{#a{#b#}c#}");
    assert_eq!(
        template.segments(),
        &[Segment::Comment("a{#b#}c".to_string())]
    );
    assert_eq!(render("x{#a{#b#}c#}y", &vars(&[])), "xy");
}

#[test]
fn control_blocks() {
    assert_eq!(
        render_all("{% if flag %}yes{% else %}no{% endif %}", &[("flag", Value::Bool(true))]),
        "yes"
    );
    assert_eq!(
        render_all("{% if n > 1 %}many{% elif n %}one{% else %}none{% endif %}", &[(
            "n",
            Value::Int(0)
        )]),
        "none"
    );
    assert_eq!(
        render_all("[{% if flag %}on{% endif %}]", &[("flag", Value::Bool(false))]),
        "[]"
    );
    assert_eq!(
        render_all("{% for x in range(3) %}<{{x}}>{% endfor %}", &[]),
        "<0><1><2>"
    );
    let items = Value::list([
        Value::list([Value::from("a"), Value::Int(1)]),
        Value::list([Value::from("b"), Value::Int(2)]),
    ]);
    assert_eq!(
        render_all("{% for k, v in items %}{{k}}={{v}};{% endfor %}", &[("items", items)]),
        "a=1;b=2;"
    );
    assert_eq!(
        render_all("{% with a = 1; b = a + 1 %}{{a}}{{b}}{% endwith %}", &[]),
        "12"
    );
}

#[test]
fn unresolved_block_waits_for_its_condition() {
    let once = parse("<{% if flag %}yes{% else %}no{% endif %}>")
        .substitute(&vars(&[]), true, &Renderers::default())
        .unwrap();
    assert_eq!(once.identifiers(), set(&["flag"]));
    assert_eq!(
        once.render(&vars(&[("flag", Value::Int(0))]), &Renderers::default())
            .unwrap(),
        "<no>"
    );
}

#[test]
fn methods_builtins_and_lambdas() {
    let names = Value::list(["bob", "ada"].map(Value::from));
    assert_eq!(
        render_all("{{ ', '.join(sorted(names)) }}", &[("names", names)]),
        "ada, bob"
    );
    let user = Value::mapping([(Value::from("name"), Value::from("ada"))]);
    assert_eq!(
        render_all("{{ user.name.upper() }} {{ user.get('age', 36) }}", &[("user", user)]),
        "ADA 36"
    );
    assert_eq!(render_all("{{ (lambda x: x * 2)(21) }}", &[]), "42");
    assert_eq!(render_all("{{ 'abcdef'[1:5:2] }} {{ [1, 2, 3][-1] }}", &[]), "bd 3");
    assert_eq!(render_all("{{ '{} {}'.format(len('abc'), max(1, 5)) }}", &[]), "3 5");
}

#[derive(Debug)]
struct Vec2(i64, i64);

impl HostObject for Vec2 {
    fn type_name(&self) -> &str {
        "Vec2"
    }

    fn attribute(&self, name: &str) -> NativeResult {
        match name {
            "x" => Ok(Value::Int(self.0)),
            "y" => Ok(Value::Int(self.1)),
            _ => Err(NativeError::Unsupported),
        }
    }

    fn binary_op(&self, op: BinaryOp, other: &Value, _reflected: bool) -> NativeResult {
        let Value::Host(other) = other else {
            return Err(NativeError::Unsupported);
        };
        match op {
            BinaryOp::MatMul => {
                let x = other.attribute("x")?.as_int().unwrap_or(0);
                let y = other.attribute("y")?.as_int().unwrap_or(0);
                Ok(Value::Int(self.0 * x + self.1 * y))
            }
            _ => Err(NativeError::Unsupported),
        }
    }
}

#[test]
fn host_objects_take_part_in_operators() {
    let variables = vars(&[
        ("a", Value::host(Vec2(1, 2))),
        ("b", Value::host(Vec2(3, 4))),
    ]);
    assert_eq!(render("{{a@b}} {{a.y}}", &variables), "11 2");
    let err = parse("{{a + b}}")
        .render(&variables, &Renderers::default())
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidBinaryOp { .. }));
}

// === errors ===

#[test]
fn evaluation_errors_carry_the_origin() {
    let err = parse("ok\n{{1 // 0}}")
        .render(&vars(&[]), &Renderers::default())
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    let origin = err.origin.unwrap();
    assert_eq!((origin.line, origin.column), (2, 3));
}

#[test]
fn malformed_templates_fail_to_parse() {
    let syntax = TemplateSyntaxConfig::default();
    assert!(Template::parse("{{ 1 + }}", &syntax).is_err());
    assert!(Template::parse("{# open", &syntax).is_err());
    assert!(Template::parse("a{% endif %}", &syntax).is_err());
    assert!(Template::parse("{{ 'unterminated }}", &syntax).is_err());
}

#[test]
fn custom_syntax() {
    let syntax = TemplateSyntaxConfig::builder()
        .expression("[[", "]]")
        .build()
        .unwrap();
    let template = Template::parse("{{x}}=[[ x ]]", &syntax).unwrap();
    assert_eq!(
        template
            .render(&vars(&[("x", Value::Int(5))]), &Renderers::default())
            .unwrap(),
        "{{x}}=5"
    );
}

// === core entry points ===

#[test]
fn template_root_evaluates_to_text() {
    let root = forma::parse("a{{1 + n}}{#c#}b", &TemplateSyntaxConfig::default()).unwrap();
    let value = evaluate(&root, &vars(&[("n", Value::Int(1))]), &Renderers::default()).unwrap();
    assert_eq!(value, Value::from("a2b"));

    let partial = forma::simplify(&root, &vars(&[]), &Renderers::default()).unwrap();
    assert_eq!(forma::identifiers(&partial), set(&["n"]));
    assert_eq!(
        expression("1 + n"),
        match &partial.kind {
            forma::ExprKind::Template(parts) => parts[1].clone(),
            other => panic!("expected a template, got {other:?}"),
        }
    );
}
