//! Iteration and name binding.

use forma_ir::Value;

use crate::environment::Variables;
use crate::errors::{destructure_arity, destructure_type, not_iterable, EvalError};

/// Items produced by iterating `value`: list elements, string characters,
/// or mapping keys.
pub fn iterate(value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::List(items) => Ok(items.to_vec()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        Value::Mapping(m) => Ok(m.keys().cloned().collect()),
        other => Err(not_iterable(other)),
    }
}

/// Bind `names` to `value`.
///
/// A single name takes the whole value. Several names unpack an iterable
/// value of exactly that many items.
pub fn destructure(names: &[String], value: &Value) -> Result<Variables, EvalError> {
    let mut bound = Variables::default();
    destructure_into(&mut bound, names, value)?;
    Ok(bound)
}

/// [`destructure`] into an existing map, overwriting earlier entries.
pub fn destructure_into(
    bound: &mut Variables,
    names: &[String],
    value: &Value,
) -> Result<(), EvalError> {
    if let [name] = names {
        bound.insert(name.clone(), value.clone());
        return Ok(());
    }
    let items = match value {
        Value::List(_) | Value::Str(_) | Value::Mapping(_) => iterate(value)?,
        other => return Err(destructure_type(other, names.len())),
    };
    if items.len() != names.len() {
        return Err(destructure_arity(names.len(), items.len()));
    }
    bound.extend(names.iter().cloned().zip(items));
    Ok(())
}
