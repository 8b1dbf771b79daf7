//! Attribute access, indexing and calls on resolved values.
//!
//! Methods on built-in kinds are returned as bound [`Builtin`] values, so
//! `s.upper()` folds in two steps: the attribute yields a callable and the
//! call applies it.

use std::sync::Arc;

use forma_ir::{Builtin, Closure, Invoke, Mapping, NativeError, NativeResult, Value};

use crate::arguments::{bind, expect_int, expect_str, optional_str, slot};
use crate::destructure::iterate;
use crate::environment::{Scope, Variables};
use crate::errors::{
    arity_mismatch, bad_argument, from_native, host_error, index_out_of_range, into_native,
    key_not_found, no_such_attribute, not_callable, not_indexable, unresolved_identifiers,
    EvalError, EvalResult,
};
use crate::identifiers::identifiers;
use crate::renderers::Renderers;
use crate::simplify::simplify_in;

// Attributes

/// `object.name`.
pub fn get_attribute(object: &Value, name: &str) -> EvalResult {
    match object {
        Value::Str(s) => str_method(s, name)
            .map(|found| Value::Builtin(found.bound_to(object.clone())))
            .ok_or_else(|| no_such_attribute(object, name)),
        Value::Mapping(m) => mapping_method(m, name)
            .map(|found| Value::Builtin(found.bound_to(object.clone())))
            .or_else(|| m.get_str(name).cloned())
            .ok_or_else(|| no_such_attribute(object, name)),
        Value::Host(host) => match host.attribute(name) {
            Ok(value) => Ok(value),
            Err(NativeError::Unsupported) => Err(no_such_attribute(object, name)),
            Err(error) => Err(host_failure(host.type_name(), error)),
        },
        _ => Err(no_such_attribute(object, name)),
    }
}

fn host_failure(type_name: &str, error: NativeError) -> EvalError {
    match error {
        NativeError::Nested(inner) => match inner.downcast::<EvalError>() {
            Ok(error) => *error,
            Err(other) => host_error(type_name, other.to_string()),
        },
        other => host_error(type_name, other.to_string()),
    }
}

fn method(
    name: &str,
    func: impl Fn(&[Value], &[(String, Value)], &dyn Invoke) -> NativeResult
        + Send
        + Sync
        + 'static,
) -> Builtin {
    Builtin::new(name, func)
}

fn str_method(s: &Arc<str>, name: &str) -> Option<Builtin> {
    let s = Arc::clone(s);
    let value = match name {
        "upper" => method("str.upper", move |args, kwargs, _| {
            bind(&[], 0, args, kwargs)?;
            Ok(Value::from(s.to_uppercase()))
        }),
        "lower" => method("str.lower", move |args, kwargs, _| {
            bind(&[], 0, args, kwargs)?;
            Ok(Value::from(s.to_lowercase()))
        }),
        "strip" | "lstrip" | "rstrip" => {
            let which = name.to_string();
            method(&format!("str.{name}"), move |args, kwargs, _| {
                let slots = bind(&["chars"], 0, args, kwargs)?;
                let chars = optional_str(slots[0], "chars")?;
                Ok(Value::from(strip(&s, &which, chars)))
            })
        }
        "split" => method("str.split", move |args, kwargs, _| {
            let slots = bind(&["sep", "maxsplit"], 0, args, kwargs)?;
            let sep = optional_str(slots[0], "sep")?;
            let max = match slots[1] {
                Some(v) => expect_int(v, "maxsplit")?,
                None => -1,
            };
            split(&s, sep, max)
        }),
        "join" => method("str.join", move |args, kwargs, _| {
            let slots = bind(&["iterable"], 1, args, kwargs)?;
            let items = iterate(slot(&slots, 0)).map_err(into_native)?;
            let parts = items
                .iter()
                .map(|item| expect_str(item, "sequence item").map(str::to_string))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::from(parts.join(&*s)))
        }),
        "replace" => method("str.replace", move |args, kwargs, _| {
            let slots = bind(&["old", "new", "count"], 2, args, kwargs)?;
            let old = expect_str(slot(&slots, 0), "old")?;
            let new = expect_str(slot(&slots, 1), "new")?;
            let count = match slots[2] {
                Some(v) => expect_int(v, "count")?,
                None => -1,
            };
            Ok(Value::from(match usize::try_from(count) {
                Ok(n) => s.replacen(old, new, n),
                Err(_) => s.replace(old, new),
            }))
        }),
        "startswith" => method("str.startswith", move |args, kwargs, _| {
            let slots = bind(&["prefix"], 1, args, kwargs)?;
            let prefix = expect_str(slot(&slots, 0), "prefix")?;
            Ok(Value::Bool(s.starts_with(prefix)))
        }),
        "endswith" => method("str.endswith", move |args, kwargs, _| {
            let slots = bind(&["suffix"], 1, args, kwargs)?;
            let suffix = expect_str(slot(&slots, 0), "suffix")?;
            Ok(Value::Bool(s.ends_with(suffix)))
        }),
        "format" => method("str.format", move |args, kwargs, _| {
            format_str(&s, args, kwargs).map(Value::from)
        }),
        _ => return None,
    };
    Some(value)
}

fn strip(s: &str, which: &str, chars: Option<&str>) -> String {
    let matches = |c: char| match chars {
        Some(set) => set.contains(c),
        None => c.is_whitespace(),
    };
    match which {
        "lstrip" => s.trim_start_matches(matches),
        "rstrip" => s.trim_end_matches(matches),
        _ => s.trim_matches(matches),
    }
    .to_string()
}

fn split(s: &str, sep: Option<&str>, max: i64) -> NativeResult {
    let limit = usize::try_from(max).ok();
    let parts: Vec<Value> = match sep {
        Some("") => return Err(NativeError::failed("empty separator")),
        Some(sep) => match limit {
            Some(n) => s.splitn(n.saturating_add(1), sep).map(Value::from).collect(),
            None => s.split(sep).map(Value::from).collect(),
        },
        None => {
            let mut parts = Vec::new();
            let mut rest = s.trim_start();
            while !rest.is_empty() && limit.map_or(true, |n| parts.len() < n) {
                if let Some(end) = rest.find(char::is_whitespace) {
                    parts.push(Value::from(&rest[..end]));
                    rest = rest[end..].trim_start();
                } else {
                    parts.push(Value::from(rest));
                    rest = "";
                }
            }
            if !rest.is_empty() {
                parts.push(Value::from(rest));
            }
            parts
        }
    };
    Ok(Value::from(parts))
}

/// `str.format` with `{}`, `{0}` and `{name}` fields and `{{`/`}}` escapes.
fn format_str(
    template: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> Result<String, NativeError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(NativeError::failed("unterminated replacement field"))
                        }
                    }
                }
                let value = if field.is_empty() {
                    next_auto += 1;
                    args.get(next_auto - 1)
                } else if let Ok(position) = field.parse::<usize>() {
                    args.get(position)
                } else {
                    kwargs.iter().find(|(k, _)| *k == field).map(|(_, v)| v)
                };
                let value = value.ok_or_else(|| {
                    NativeError::failed(format!("no value for replacement field {{{field}}}"))
                })?;
                out.push_str(&value.to_string());
            }
            '}' => return Err(NativeError::failed("single '}' in format string")),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn mapping_method(m: &Arc<Mapping>, name: &str) -> Option<Builtin> {
    let m = Arc::clone(m);
    let value = match name {
        "get" => method("dict.get", move |args, kwargs, _| {
            let slots = bind(&["key", "default"], 1, args, kwargs)?;
            let key = slot(&slots, 0);
            Ok(m.get(key).or(slots[1]).cloned().unwrap_or(Value::None))
        }),
        "keys" => method("dict.keys", move |args, kwargs, _| {
            bind(&[], 0, args, kwargs)?;
            Ok(Value::list(m.keys().cloned()))
        }),
        "values" => method("dict.values", move |args, kwargs, _| {
            bind(&[], 0, args, kwargs)?;
            Ok(Value::list(m.values().cloned()))
        }),
        "items" => method("dict.items", move |args, kwargs, _| {
            bind(&[], 0, args, kwargs)?;
            Ok(Value::list(m.iter().map(|(k, v)| Value::list([k.clone(), v.clone()]))))
        }),
        _ => return None,
    };
    Some(value)
}

// Indexing

/// Position of `index` in a sequence of `len` items, counting negative
/// indices from the end.
fn position(index: i64, len: usize) -> Result<usize, EvalError> {
    let signed_len = i64::try_from(len).map_err(|_| index_out_of_range(index, len))?;
    let absolute = if index < 0 { index + signed_len } else { index };
    usize::try_from(absolute)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_range(index, len))
}

fn bad_index(base: &Value, index: &Value) -> EvalError {
    EvalError::new(format!(
        "{} indices must be integers or slices, not {}",
        base.type_name(),
        index.type_name()
    ))
}

/// `base[index]`.
pub fn index_value(base: &Value, index: &Value) -> EvalResult {
    match base {
        Value::List(items) => match index {
            Value::Slice(slice) => {
                let picked = slice
                    .indices(items.len())
                    .ok_or_else(|| EvalError::new("slice step cannot be zero"))?;
                Ok(Value::list(picked.into_iter().map(|i| items[i].clone())))
            }
            other => {
                let i = other.as_int().ok_or_else(|| bad_index(base, other))?;
                Ok(items[position(i, items.len())?].clone())
            }
        },
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            match index {
                Value::Slice(slice) => {
                    let picked = slice
                        .indices(chars.len())
                        .ok_or_else(|| EvalError::new("slice step cannot be zero"))?;
                    Ok(Value::from(picked.into_iter().map(|i| chars[i]).collect::<String>()))
                }
                other => {
                    let i = other.as_int().ok_or_else(|| bad_index(base, other))?;
                    Ok(Value::from(chars[position(i, chars.len())?].to_string()))
                }
            }
        }
        Value::Mapping(m) => m.get(index).cloned().ok_or_else(|| key_not_found(index)),
        Value::Host(host) => match host.index(index) {
            Ok(value) => Ok(value),
            Err(NativeError::Unsupported) => Err(not_indexable(base)),
            Err(error) => Err(host_failure(host.type_name(), error)),
        },
        _ => Err(not_indexable(base)),
    }
}

// Calls

/// `callee(*args, **kwargs)`.
pub fn call_value(
    callee: &Value,
    args: &[Value],
    kwargs: &[(String, Value)],
    renderers: &Renderers,
) -> EvalResult {
    match callee {
        Value::Builtin(builtin) => builtin
            .call(args, kwargs, &Callbacks { renderers })
            .map_err(|e| from_native(e, builtin.name())),
        Value::Lambda(closure) => call_closure(closure, args, kwargs, renderers),
        Value::Host(host) => match host.call(args, kwargs) {
            Ok(value) => Ok(value),
            Err(NativeError::Unsupported) => Err(not_callable(callee)),
            Err(error) => Err(host_failure(host.type_name(), error)),
        },
        _ => Err(not_callable(callee)),
    }
}

const LAMBDA: &str = "<lambda>";

fn call_closure(
    closure: &Closure,
    args: &[Value],
    kwargs: &[(String, Value)],
    renderers: &Renderers,
) -> EvalResult {
    let params = &closure.params;
    let supplied = args.len() + kwargs.len();
    if args.len() > params.len() {
        return Err(arity_mismatch(LAMBDA, params.len(), supplied));
    }
    let mut bound: Variables = params.iter().cloned().zip(args.iter().cloned()).collect();
    for (name, value) in kwargs {
        if !params.contains(name) {
            return Err(bad_argument(
                LAMBDA,
                format!("unexpected keyword argument '{name}'"),
            ));
        }
        if bound.insert(name.clone(), value.clone()).is_some() {
            return Err(bad_argument(
                LAMBDA,
                format!("got multiple values for argument '{name}'"),
            ));
        }
    }
    if bound.len() != params.len() {
        return Err(arity_mismatch(LAMBDA, params.len(), supplied));
    }
    let body = simplify_in(&closure.body, &Scope::new(&bound), renderers)?;
    body.into_value()
        .map_err(|rest| unresolved_identifiers(identifiers(&rest)).with_origin(rest.origin))
}

/// Lets native code call template values under the renderers of the
/// evaluation that called it.
struct Callbacks<'r> {
    renderers: &'r Renderers,
}

impl Invoke for Callbacks<'_> {
    fn invoke(&self, callee: &Value, args: &[Value]) -> NativeResult {
        call_value(callee, args, &[], self.renderers).map_err(into_native)
    }
}
