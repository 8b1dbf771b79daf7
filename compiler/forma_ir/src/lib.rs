//! Forma IR - shared vocabulary for the forma template language.
//!
//! This crate contains the data structures every other stage agrees on:
//! - [`Origin`] source positions attached to expression nodes
//! - [`BinaryOp`] / [`UnaryOp`] operator enumerations
//! - The [`Expr`] tree produced by the parser and rewritten by the simplifier
//! - The closed [`Value`] sum type, including host objects behind the
//!   [`HostObject`] capability trait
//!
//! # Design
//!
//! - **Immutable trees**: expression nodes are never mutated in place; every
//!   rewrite builds a new node.
//! - **Origins are metadata**: two expressions compare equal when their shape
//!   and values match, regardless of where they came from.
//! - **Closed value set**: operators dispatch on [`ValueKind`], so unknown
//!   combinations produce typed errors instead of falling through.

pub mod ast;
mod origin;
pub mod value;

pub use ast::{BinaryOp, Binding, Expr, ExprKind, IfCase, Names, UnaryOp};
pub use origin::{Origin, ANONYMOUS_SOURCE};
pub use value::{
    Builtin, Closure, HostObject, Invoke, Mapping, NativeError, NativeFn, NativeResult, SliceValue,
    Value, ValueKind,
};
