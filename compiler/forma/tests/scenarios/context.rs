//! `TemplateContext`: defaults and cached loading.

use std::path::PathBuf;
use std::sync::Arc;

use forma::{Error, Template, TemplateContext, TemplateSyntaxConfig, Value, Variables};
use pretty_assertions::assert_eq;

use crate::common::{parse, text, vars};

/// A fresh directory under the system temp dir, unique to this test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("forma-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn identifiers_exclude_defaults() {
    let context = TemplateContext::new();
    assert!(context.identifiers(&parse("")).is_empty());
    assert!(context.identifiers(&parse("{{min(1, 2)}}")).is_empty());
    assert_eq!(
        context.identifiers(&parse("{{foo}}")).into_iter().collect::<Vec<_>>(),
        vec!["foo".to_string()]
    );

    let with_foo = TemplateContext::new().with_variables(vars(&[("foo", Value::from("foo"))]));
    assert!(with_foo.identifiers(&parse("{{foo}}")).is_empty());
}

#[test]
fn substitute_applies_defaults() {
    let context = TemplateContext::new();
    let none = Variables::default();
    assert_eq!(context.substitute(&parse(""), &none, true).unwrap(), Template::default());
    assert_eq!(
        context.substitute(&parse("{{min(1, 2)}}"), &none, true).unwrap().segments(),
        &[text("1")]
    );
    assert_eq!(
        context.substitute(&parse("{{foo}}"), &none, true).unwrap(),
        parse("{{foo}}")
    );
}

#[test]
fn caller_variables_win_over_defaults() {
    let context = TemplateContext::new();
    let template = parse("{{min(1, 2)}}");
    assert_eq!(context.render(&template, &Variables::default()).unwrap(), "1");

    let max = forma::default_variables()["max"].clone();
    assert_eq!(context.render(&template, &vars(&[("min", max)])).unwrap(), "2");
}

#[test]
fn bare_context_has_no_builtins() {
    let context = TemplateContext::with_defaults(Variables::default());
    let err = context
        .render(&parse("{{len('abc')}}"), &Variables::default())
        .unwrap_err();
    assert!(err.is_unresolved());
}

#[test]
fn load_template_reads_each_path_once() {
    let dir = scratch_dir("cache");
    std::fs::write(dir.join("greeting.txt"), "hello {{name}}").unwrap();
    std::fs::write(dir.join("other.txt"), "other").unwrap();

    let context = TemplateContext::new().with_base_dir(&dir);
    let first = context.load_template("greeting.txt").unwrap();
    assert_eq!(
        context
            .render(&first, &vars(&[("name", Value::from("ada"))]))
            .unwrap(),
        "hello ada"
    );

    // A cached template survives changes on disk.
    std::fs::write(dir.join("greeting.txt"), "changed").unwrap();
    let second = context.load_template("greeting.txt").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = context.load_template("other.txt").unwrap();
    assert!(!Arc::ptr_eq(&first, &other));

    // Absolute paths bypass the base dir but share the cache key.
    let absolute = context.load_template(dir.join("greeting.txt")).unwrap();
    assert!(Arc::ptr_eq(&first, &absolute));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_template_errors() {
    let dir = scratch_dir("errors");
    std::fs::write(dir.join("broken.txt"), "{{ 1 + }}").unwrap();
    let context = TemplateContext::new().with_base_dir(&dir);

    let missing = context.load_template("missing.txt").unwrap_err();
    assert!(matches!(missing, Error::Io { ref path, .. } if path.ends_with("missing.txt")));

    let broken = context.load_template("broken.txt").unwrap_err();
    assert!(matches!(broken, Error::Parse(_)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn loaded_templates_use_the_context_syntax() {
    let dir = scratch_dir("syntax");
    std::fs::write(dir.join("page.txt"), "<% x %> {{x}}").unwrap();
    let syntax = TemplateSyntaxConfig::builder()
        .expression("<%", "%>")
        .environment("<@", "@>")
        .build()
        .unwrap();
    let context = TemplateContext::new()
        .with_base_dir(&dir)
        .with_syntax(syntax);

    let page = context.load_template("page.txt").unwrap();
    assert_eq!(
        context.render(&page, &vars(&[("x", Value::Int(1))])).unwrap(),
        "1 {{x}}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unresolved_render_is_reported_through_the_facade_error() {
    let context = TemplateContext::new();
    let err: Error = context
        .render(&parse("{{missing}}"), &Variables::default())
        .unwrap_err()
        .into();
    assert!(err.is_unresolved());
    assert!(err.to_string().contains("missing"));
}
