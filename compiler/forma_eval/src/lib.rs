//! Forma Eval - identifier analysis, partial evaluation and evaluation.
//!
//! # Architecture
//!
//! - [`identifiers`]: free names of a tree, respecting the names each binding
//!   construct introduces
//! - [`simplify`]: substitute known variables and fold every subtree whose
//!   inputs are all resolved; the result never grows
//! - [`evaluate`]: `simplify` to a single value, or fail naming what is
//!   still unresolved
//! - `evaluate_binary` / `evaluate_unary`: enum-based operator dispatch over
//!   the closed [`Value`](forma_ir::Value) set
//! - [`Renderers`]: value-to-text conversion for template splicing
//! - [`default_variables`]: the builtin functions offered to templates
//!
//! Errors are typed [`EvalError`]s carrying the origin of the deepest node
//! that failed.

mod arguments;
mod builtins;
mod destructure;
mod environment;
pub mod errors;
mod identifiers;
mod methods;
mod operators;
mod renderers;
mod simplify;
mod unary_operators;

pub use builtins::default_variables;
pub use destructure::{destructure, iterate};
pub use environment::{Scope, Variables};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use identifiers::{identifiers, is_closed};
pub use methods::{call_value, get_attribute, index_value};
pub use operators::{compare_values, evaluate_binary};
pub use renderers::{display, RenderFn, RenderKey, Renderers};
pub use simplify::{evaluate, simplify, SimplifyResult};
pub use unary_operators::evaluate_unary;

#[cfg(test)]
mod tests;
