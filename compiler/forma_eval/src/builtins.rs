//! Default global functions.
//!
//! [`default_variables`] returns the functions a template context offers
//! before any caller-supplied variables: `len`, `min`, `max`, `abs`, `sum`,
//! `range`, `sorted`, `str`, `int`, `float`, `bool`, `enumerate` and `zip`.
//! They follow the dynamic-language builtins of the same names, restricted to
//! the value kinds templates manipulate.

use std::cmp::Ordering;

use forma_ir::{Builtin, Invoke, NativeError, NativeResult, Value};

use crate::arguments::{bind, expect_int, no_keywords, slot};
use crate::destructure::iterate;
use crate::environment::Variables;
use crate::errors::into_native;
use crate::operators::{compare_values, evaluate_binary};

/// Longest list `range` will build.
const MAX_RANGE_LEN: usize = 10_000_000;

type NativeFnPtr = fn(&[Value], &[(String, Value)], &dyn Invoke) -> NativeResult;

const BUILTINS: &[(&str, NativeFnPtr)] = &[
    ("len", len),
    ("min", min),
    ("max", max),
    ("abs", abs),
    ("sum", sum),
    ("range", range),
    ("sorted", sorted),
    ("str", to_str),
    ("int", to_int),
    ("float", to_float),
    ("bool", to_bool),
    ("enumerate", enumerate),
    ("zip", zip),
];

/// Fresh map of the default global functions.
pub fn default_variables() -> Variables {
    BUILTINS
        .iter()
        .map(|&(name, func)| {
            (
                name.to_string(),
                Value::Builtin(Builtin::new(name, func)),
            )
        })
        .collect()
}

fn items(value: &Value) -> Result<Vec<Value>, NativeError> {
    iterate(value).map_err(into_native)
}

fn len(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["obj"], 1, args, kwargs)?;
    let n = match slot(&slots, 0) {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Mapping(m) => m.len(),
        other => {
            return Err(NativeError::failed(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| NativeError::failed("length does not fit in an int"))
}

/// Total order used by `min`, `max` and `sorted`; incomparable values fail.
fn order(a: &Value, b: &Value) -> Result<Ordering, NativeError> {
    Ok(compare_values(a, b)
        .map_err(into_native)?
        .unwrap_or(Ordering::Equal))
}

/// Sort key of each item: the item itself, or `key(item)`.
fn keys_of(
    values: &[Value],
    key: Option<&Value>,
    invoke: &dyn Invoke,
) -> Result<Vec<Value>, NativeError> {
    match key {
        None | Some(Value::None) => Ok(values.to_vec()),
        Some(key) => values
            .iter()
            .map(|v| invoke.invoke(key, std::slice::from_ref(v)))
            .collect(),
    }
}

/// Shared body of `min` and `max`: keep the first extreme item.
fn extreme(
    name: &str,
    wanted: Ordering,
    args: &[Value],
    kwargs: &[(String, Value)],
    invoke: &dyn Invoke,
) -> NativeResult {
    let mut key = None;
    let mut default = None;
    for (k, v) in kwargs {
        match k.as_str() {
            "key" => key = Some(v),
            "default" => default = Some(v),
            _ => return Err(NativeError::UnexpectedKeyword(k.clone())),
        }
    }
    let candidates = match args {
        [] => {
            return Err(NativeError::Arity {
                expected: "at least 1".to_string(),
                got: 0,
            })
        }
        [single] => items(single)?,
        many => many.to_vec(),
    };
    let keys = keys_of(&candidates, key, invoke)?;
    let mut best: Option<usize> = None;
    for (i, k) in keys.iter().enumerate() {
        match best {
            Some(b) if order(k, &keys[b])? != wanted => {}
            _ => best = Some(i),
        }
    }
    match best {
        Some(i) => Ok(candidates[i].clone()),
        None => default
            .cloned()
            .ok_or_else(|| NativeError::failed(format!("{name}() arg is an empty sequence"))),
    }
}

fn min(args: &[Value], kwargs: &[(String, Value)], invoke: &dyn Invoke) -> NativeResult {
    extreme("min", Ordering::Less, args, kwargs, invoke)
}

fn max(args: &[Value], kwargs: &[(String, Value)], invoke: &dyn Invoke) -> NativeResult {
    extreme("max", Ordering::Greater, args, kwargs, invoke)
}

fn abs(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["x"], 1, args, kwargs)?;
    match slot(&slots, 0) {
        Value::Float(x) => Ok(Value::Float(x.abs())),
        other => {
            let n = expect_int(other, "abs() argument")?;
            n.checked_abs()
                .map(Value::Int)
                .ok_or_else(|| NativeError::failed("integer overflow in abs()"))
        }
    }
}

fn sum(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["iterable", "start"], 1, args, kwargs)?;
    let mut total = slots[1].cloned().unwrap_or(Value::Int(0));
    for item in items(slot(&slots, 0))? {
        total = evaluate_binary(forma_ir::BinaryOp::Add, &total, &item).map_err(into_native)?;
    }
    Ok(total)
}

fn range(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    no_keywords(kwargs)?;
    let bounds = args
        .iter()
        .map(|a| expect_int(a, "range() argument"))
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match bounds.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(NativeError::Arity {
                expected: "1 to 3".to_string(),
                got: args.len(),
            })
        }
    };
    if step == 0 {
        return Err(NativeError::failed("range() arg 3 must not be zero"));
    }
    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if out.len() >= MAX_RANGE_LEN {
            return Err(NativeError::failed("range() result too large"));
        }
        out.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(Value::from(out))
}

fn sorted(args: &[Value], kwargs: &[(String, Value)], invoke: &dyn Invoke) -> NativeResult {
    let slots = bind(&["iterable", "key", "reverse"], 1, args, kwargs)?;
    let values = items(slot(&slots, 0))?;
    let keys = keys_of(&values, slots[1], invoke)?;
    let reverse = slots[2].is_some_and(Value::is_truthy);

    let mut failure = None;
    let mut positions: Vec<usize> = (0..values.len()).collect();
    positions.sort_by(|&a, &b| {
        let ordering = match order(&keys[a], &keys[b]) {
            Ok(ordering) => ordering,
            Err(error) => {
                failure.get_or_insert(error);
                Ordering::Equal
            }
        };
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
    if let Some(error) = failure {
        return Err(error);
    }
    Ok(Value::list(positions.into_iter().map(|i| values[i].clone())))
}

fn to_str(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["object"], 0, args, kwargs)?;
    Ok(Value::from(slots[0].map(Value::to_string).unwrap_or_default()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_int(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["x"], 0, args, kwargs)?;
    match slots[0] {
        None => Ok(Value::Int(0)),
        Some(Value::Float(x)) => {
            let truncated = x.trunc();
            let in_range = truncated >= i64::MIN as f64 && truncated < i64::MAX as f64;
            if truncated.is_finite() && in_range {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(NativeError::failed(format!(
                    "cannot convert float {x} to integer"
                )))
            }
        }
        Some(Value::Str(s)) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| {
                NativeError::failed(format!(
                    "invalid literal for int(): {}",
                    Value::Str(s.clone()).repr()
                ))
            }),
        Some(other) => expect_int(other, "int() argument").map(Value::Int),
    }
}

fn to_float(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["x"], 0, args, kwargs)?;
    match slots[0] {
        None => Ok(Value::Float(0.0)),
        Some(Value::Str(s)) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            NativeError::failed(format!(
                "could not convert string to float: {}",
                Value::Str(s.clone()).repr()
            ))
        }),
        Some(other) => other.as_float().map(Value::Float).ok_or_else(|| {
            NativeError::failed(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn to_bool(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["x"], 0, args, kwargs)?;
    Ok(Value::Bool(slots[0].is_some_and(Value::is_truthy)))
}

fn enumerate(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    let slots = bind(&["iterable", "start"], 1, args, kwargs)?;
    let start = match slots[1] {
        Some(v) => expect_int(v, "start")?,
        None => 0,
    };
    let mut out = Vec::new();
    for (offset, item) in items(slot(&slots, 0))?.into_iter().enumerate() {
        let index = i64::try_from(offset)
            .ok()
            .and_then(|o| start.checked_add(o))
            .ok_or_else(|| NativeError::failed("integer overflow in enumerate()"))?;
        out.push(Value::list([Value::Int(index), item]));
    }
    Ok(Value::from(out))
}

fn zip(args: &[Value], kwargs: &[(String, Value)], _: &dyn Invoke) -> NativeResult {
    no_keywords(kwargs)?;
    let columns = args.iter().map(items).collect::<Result<Vec<_>, _>>()?;
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    Ok(Value::list((0..rows).map(|row| {
        Value::list(columns.iter().map(|column| column[row].clone()))
    })))
}
