//! Stack growth for recursive grammar rules and tree walks.
//!
//! Template nesting (`{% if %}` inside `{% for %}` inside parentheses, and so
//! on) maps directly onto native recursion in both the parser combinators and
//! the simplifier. Nesting depth is controlled by whoever writes the template,
//! so every recursive entry point runs inside [`ensure_sufficient_stack`].
//!
//! On native targets the stack is extended with `stacker` once less than
//! [`RED_ZONE`] bytes remain. On `wasm32` the closure is called directly.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is low.
///
/// Wrap the body of any function that recurses on user-controlled depth:
///
/// ```text
/// fn simplify(expr: &Expr, env: &Variables) -> Result<Expr, EvalError> {
///     ensure_sufficient_stack(|| match &expr.kind {
///         // ... recursive cases ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` has no segmented stacks; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
