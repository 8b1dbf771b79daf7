//! Unary operator implementations.

use forma_ir::{UnaryOp, Value};

use crate::errors::{integer_overflow, invalid_unary_op, EvalResult};

/// Evaluate `op operand` on a resolved operand.
///
/// `not` applies to every value through truthiness; the arithmetic
/// operators accept numbers only, with `bool` promoted to `int`.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Pos, Value::Float(x)) => Ok(Value::Float(*x)),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Pos | UnaryOp::Neg | UnaryOp::Invert, value) => {
            let Some(n) = value.as_int() else {
                return Err(invalid_unary_op(op, value));
            };
            match op {
                UnaryOp::Pos => Ok(Value::Int(n)),
                UnaryOp::Neg => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| integer_overflow("negation")),
                _ => Ok(Value::Int(!n)),
            }
        }
    }
}
