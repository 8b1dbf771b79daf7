//! Builtins the grammar itself emits.
//!
//! `a[1:2]` parses to an index by a call of [`Builtin::slice`], and a
//! `{% for %}` block parses to a call of [`Builtin::concat`] on the loop, so
//! both must exist before any evaluation context does.

use super::{Builtin, Invoke, NativeError, NativeResult, SliceValue, Value};

fn bound(value: &Value) -> Result<Option<i64>, NativeError> {
    match value {
        Value::None => Ok(None),
        other => other.as_int().map(Some).ok_or_else(|| {
            NativeError::failed(format!(
                "slice indices must be integers or None, not {}",
                other.type_name()
            ))
        }),
    }
}

fn build_slice(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    if let Some((name, _)) = kwargs.first() {
        return Err(NativeError::UnexpectedKeyword(name.clone()));
    }
    match args {
        [start, stop, step] => Ok(Value::Slice(SliceValue::new(
            bound(start)?,
            bound(stop)?,
            bound(step)?,
        ))),
        _ => Err(NativeError::Arity {
            expected: "3".to_string(),
            got: args.len(),
        }),
    }
}

fn concat(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    if let Some((name, _)) = kwargs.first() {
        return Err(NativeError::UnexpectedKeyword(name.clone()));
    }
    let [Value::List(parts)] = args else {
        return Err(NativeError::failed("concat expects a single list of strings"));
    };
    let mut out = String::new();
    for part in parts.iter() {
        match part {
            Value::Str(s) => out.push_str(s),
            other => {
                return Err(NativeError::failed(format!(
                    "concat expects str items, found {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(Value::from(out))
}

impl Builtin {
    /// `slice(start, stop, step)`, each `None` or an integer.
    pub fn slice() -> Builtin {
        Builtin::new("slice", build_slice)
    }

    /// Joins a list of strings without a separator.
    pub fn concat() -> Builtin {
        Builtin::new("concat", concat)
    }
}
