//! Binary operator implementations.
//!
//! Dispatch is a direct match on the operand kinds. The value set is closed
//! apart from host objects, which get a chance to handle any operator
//! through [`HostObject::binary_op`](forma_ir::HostObject::binary_op) before
//! the primitive tables run.
//!
//! Integer arithmetic is checked: overflow is an error, never a wrap.

use std::cmp::Ordering;
use std::sync::Arc;

use forma_ir::{BinaryOp, Mapping, NativeError, Value};

use crate::errors::{
    division_by_zero, host_error, integer_overflow, invalid_binary_op, modulo_by_zero,
    not_iterable, sequence_too_large, EvalError, EvalResult,
};

/// Longest str (in bytes) or list repetition will build.
const MAX_REPEAT_LEN: usize = 10_000_000;

/// Operands after numeric promotion.
enum Numbers {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numbers(left: &Value, right: &Value) -> Option<Numbers> {
    match (left, right) {
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            Some(Numbers::Floats(left.as_float()?, right.as_float()?))
        }
        _ => Some(Numbers::Ints(left.as_int()?, right.as_int()?)),
    }
}

#[inline]
fn checked(result: Option<i64>, operation: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(operation))
}

/// Evaluate `left op right` on resolved operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if !op.is_short_circuit() {
        if let Some(result) = host_binary(op, left, right) {
            return result;
        }
    }
    match op {
        BinaryOp::And => Ok(if left.is_truthy() { right } else { left }.clone()),
        BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }.clone()),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            compare(op, left, right)
        }
        BinaryOp::In => contains(right, left).map(Value::Bool),
        BinaryOp::NotIn => contains(right, left).map(|found| Value::Bool(!found)),
        BinaryOp::Add => add(left, right),
        BinaryOp::Mul => multiply(left, right),
        BinaryOp::BitOr if matches!((left, right), (Value::Mapping(_), Value::Mapping(_))) => {
            merge(left, right)
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => bitwise(op, left, right),
        BinaryOp::Shl | BinaryOp::Shr => shift(op, left, right),
        BinaryOp::Sub
        | BinaryOp::Div
        | BinaryOp::FloorDiv
        | BinaryOp::Mod
        | BinaryOp::Pow => match numbers(left, right) {
            Some(Numbers::Ints(a, b)) => int_arith(op, a, b),
            Some(Numbers::Floats(a, b)) => float_arith(op, a, b),
            None => Err(invalid_binary_op(op, left, right)),
        },
        BinaryOp::MatMul => Err(invalid_binary_op(op, left, right)),
    }
}

/// Offer the operator to a host operand, left first, then reflected.
fn host_binary(op: BinaryOp, left: &Value, right: &Value) -> Option<EvalResult> {
    let attempts = [(left, right, false), (right, left, true)];
    for (receiver, other, reflected) in attempts {
        let Value::Host(host) = receiver else {
            continue;
        };
        match host.binary_op(op, other, reflected) {
            Ok(value) => return Some(Ok(value)),
            Err(NativeError::Unsupported) => {}
            Err(NativeError::Nested(inner)) => {
                return Some(Err(match inner.downcast::<EvalError>() {
                    Ok(error) => *error,
                    Err(other) => host_error(host.type_name(), other.to_string()),
                }))
            }
            Err(error) => return Some(Err(host_error(host.type_name(), error.to_string()))),
        }
    }
    None
}

fn add(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Value::from(out))
        }
        (Value::List(a), Value::List(b)) => Ok(Value::list(a.iter().chain(b.iter()).cloned())),
        _ => match numbers(left, right) {
            Some(Numbers::Ints(a, b)) => checked(a.checked_add(b), "addition"),
            Some(Numbers::Floats(a, b)) => Ok(Value::Float(a + b)),
            None => Err(invalid_binary_op(BinaryOp::Add, left, right)),
        },
    }
}

/// Number of copies for sequence repetition; negative counts mean none.
///
/// The repeated length may not exceed [`MAX_REPEAT_LEN`].
fn repeat_count(count: i64, len: usize) -> Result<usize, EvalError> {
    if len == 0 {
        return Ok(0);
    }
    let count = count.max(0).unsigned_abs();
    let total = u128::from(count) * len as u128;
    if total > MAX_REPEAT_LEN as u128 {
        return Err(sequence_too_large("repetition", total, MAX_REPEAT_LEN));
    }
    usize::try_from(count).map_err(|_| integer_overflow("repetition"))
}

fn multiply(left: &Value, right: &Value) -> EvalResult {
    let repeated = match (left, right) {
        (Value::Str(_) | Value::List(_), Value::Int(_) | Value::Bool(_)) => Some((left, right)),
        (Value::Int(_) | Value::Bool(_), Value::Str(_) | Value::List(_)) => Some((right, left)),
        _ => None,
    };
    if let Some((sequence, count)) = repeated {
        let count = count.as_int().unwrap_or_default();
        return match sequence {
            Value::Str(s) => Ok(Value::from(s.repeat(repeat_count(count, s.len())?))),
            Value::List(items) => {
                let times = repeat_count(count, items.len())?;
                Ok(Value::list(
                    std::iter::repeat(items.iter()).take(times).flatten().cloned(),
                ))
            }
            _ => Err(invalid_binary_op(BinaryOp::Mul, left, right)),
        };
    }
    match numbers(left, right) {
        Some(Numbers::Ints(a, b)) => checked(a.checked_mul(b), "multiplication"),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a * b)),
        None => Err(invalid_binary_op(BinaryOp::Mul, left, right)),
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

#[allow(clippy::cast_precision_loss)]
fn int_arith(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    match op {
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Div => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                checked(floor_div(a, b), "floor division")
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                Err(modulo_by_zero())
            } else {
                checked(floor_mod(a, b), "remainder")
            }
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(division_by_zero());
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            let exp = u32::try_from(b).map_err(|_| integer_overflow("exponentiation"))?;
            checked(a.checked_pow(exp), "exponentiation")
        }
        _ => Err(invalid_binary_op(op, &Value::Int(a), &Value::Int(b))),
    }
}

#[allow(clippy::float_cmp)]
fn float_arith(op: BinaryOp, a: f64, b: f64) -> EvalResult {
    match op {
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Div => {
            if b == 0.0 {
                Err(division_by_zero())
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                Err(division_by_zero())
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(modulo_by_zero());
            }
            let r = a % b;
            Ok(Value::Float(if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }))
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                Err(division_by_zero())
            } else {
                Ok(Value::Float(a.powf(b)))
            }
        }
        _ => Err(invalid_binary_op(op, &Value::Float(a), &Value::Float(b))),
    }
}

/// `&`, `|`, `^` on integers. Two booleans give a boolean.
fn bitwise(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
        return Ok(Value::Bool(match op {
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            _ => a ^ b,
        }));
    }
    let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
        return Err(invalid_binary_op(op, left, right));
    };
    Ok(Value::Int(match op {
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        _ => a ^ b,
    }))
}

fn shift(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
        return Err(invalid_binary_op(op, left, right));
    };
    if b < 0 {
        return Err(EvalError::new("negative shift count"));
    }
    if op == BinaryOp::Shr {
        return Ok(Value::Int(if b >= 64 { a >> 63 } else { a >> b }));
    }
    if a == 0 {
        return Ok(Value::Int(0));
    }
    if b >= 64 {
        return Err(integer_overflow("left shift"));
    }
    let shifted = a << b;
    if shifted >> b == a {
        Ok(Value::Int(shifted))
    } else {
        Err(integer_overflow("left shift"))
    }
}

/// `left | right` on mappings: entries of `right` win.
fn merge(left: &Value, right: &Value) -> EvalResult {
    let (Value::Mapping(a), Value::Mapping(b)) = (left, right) else {
        return Err(invalid_binary_op(BinaryOp::BitOr, left, right));
    };
    let mut merged = Mapping::clone(a);
    for (k, v) in b.iter() {
        merged.insert(k.clone(), v.clone());
    }
    Ok(Value::Mapping(Arc::new(merged)))
}

/// Ordering of two values, `None` when they are unordered (NaN involved).
pub fn compare_values(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return compare_values(x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => match numbers(left, right) {
            Some(Numbers::Ints(a, b)) => Ok(Some(a.cmp(&b))),
            Some(Numbers::Floats(a, b)) => Ok(a.partial_cmp(&b)),
            None => Err(EvalError::new(format!(
                "cannot order '{}' and '{}'",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let ordering =
        compare_values(left, right).map_err(|_| invalid_binary_op(op, left, right))?;
    let result = ordering.is_some_and(|ord| match op {
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::LtEq => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        _ => ord != Ordering::Less,
    });
    Ok(Value::Bool(result))
}

/// `needle in container`.
fn contains(container: &Value, needle: &Value) -> Result<bool, EvalError> {
    match container {
        Value::Str(haystack) => match needle {
            Value::Str(s) => Ok(haystack.contains(&**s)),
            other => Err(EvalError::new(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.iter().any(|item| item == needle)),
        Value::Mapping(m) => Ok(m.contains_key(needle)),
        other => Err(not_iterable(other)),
    }
}
