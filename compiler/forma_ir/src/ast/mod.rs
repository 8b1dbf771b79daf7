//! Expression tree and operators.

mod expr;
mod operators;

pub use expr::{Binding, Expr, ExprKind, IfCase, Names};
pub use operators::{BinaryOp, UnaryOp};

#[cfg(test)]
mod tests;
