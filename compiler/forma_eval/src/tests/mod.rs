//! Evaluator tests.
//!
//! - `operators_tests` / `unary_operators_tests`: operator tables in isolation
//! - `methods_tests`: attributes, indexing and calls on resolved values
//! - `builtins_tests`: the default global functions
//! - `renderers_tests`: renderer selection order
//! - `identifiers_tests`: free-name discovery and scoping
//! - `simplify_tests`: partial evaluation of parsed expressions

mod builtins_tests;
mod renderers_tests;
