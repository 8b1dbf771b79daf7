//! Argument binding for native functions.

use forma_ir::{NativeError, Value};

fn arity(params: usize, required: usize, got: usize) -> NativeError {
    let expected = if params == required {
        params.to_string()
    } else {
        format!("{required} to {params}")
    };
    NativeError::Arity { expected, got }
}

/// Match positional and keyword arguments against `params`.
///
/// The first `required` parameters must be supplied. Returns one slot per
/// parameter, `None` where an optional one was left out.
pub(crate) fn bind<'v>(
    params: &[&str],
    required: usize,
    args: &'v [Value],
    kwargs: &'v [(String, Value)],
) -> Result<Vec<Option<&'v Value>>, NativeError> {
    if args.len() > params.len() {
        return Err(arity(params.len(), required, args.len() + kwargs.len()));
    }
    let mut slots: Vec<Option<&Value>> = vec![None; params.len()];
    for (slot, arg) in slots.iter_mut().zip(args) {
        *slot = Some(arg);
    }
    for (name, value) in kwargs {
        let Some(i) = params.iter().position(|p| p == name) else {
            return Err(NativeError::UnexpectedKeyword(name.clone()));
        };
        if slots[i].is_some() {
            return Err(NativeError::failed(format!(
                "got multiple values for argument '{name}'"
            )));
        }
        slots[i] = Some(value);
    }
    if slots.iter().take(required).any(Option::is_none) {
        return Err(arity(params.len(), required, args.len() + kwargs.len()));
    }
    Ok(slots)
}

const NONE: &Value = &Value::None;

/// Value in slot `i`, `None` for an optional argument left out.
pub(crate) fn slot<'v>(slots: &[Option<&'v Value>], i: usize) -> &'v Value {
    slots.get(i).copied().flatten().unwrap_or(NONE)
}

/// Reject keyword arguments for functions that take none.
pub(crate) fn no_keywords(kwargs: &[(String, Value)]) -> Result<(), NativeError> {
    match kwargs.first() {
        Some((name, _)) => Err(NativeError::UnexpectedKeyword(name.clone())),
        None => Ok(()),
    }
}

pub(crate) fn expect_str<'v>(value: &'v Value, what: &str) -> Result<&'v str, NativeError> {
    value.as_str().ok_or_else(|| {
        NativeError::failed(format!("{what} must be str, not {}", value.type_name()))
    })
}

pub(crate) fn expect_int(value: &Value, what: &str) -> Result<i64, NativeError> {
    value.as_int().ok_or_else(|| {
        NativeError::failed(format!("{what} must be int, not {}", value.type_name()))
    })
}

/// An optional string argument, `None` counting as absent.
pub(crate) fn optional_str<'v>(
    value: Option<&'v Value>,
    what: &str,
) -> Result<Option<&'v str>, NativeError> {
    match value {
        None | Some(Value::None) => Ok(None),
        Some(v) => expect_str(v, what).map(Some),
    }
}
