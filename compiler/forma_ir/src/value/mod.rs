//! Runtime values.
//!
//! [`Value`] is a closed sum over the kinds a template can manipulate. The
//! semantics follow a conventional dynamic language: `bool` counts as an
//! integer for arithmetic, `int` and `float` compare numerically, and
//! `and`/`or` return one of their operands.
//!
//! Anything else a host application wants to expose goes through
//! [`HostObject`], which offers attribute, index, call and operator hooks.

mod intrinsics;
mod mapping;
mod native;
mod slice;

pub use mapping::Mapping;
pub use native::{Builtin, Closure, HostObject, Invoke, NativeError, NativeFn, NativeResult};
pub use slice::SliceValue;

use std::fmt;
use std::sync::Arc;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(Arc<[Value]>),
    Mapping(Arc<Mapping>),
    Slice(SliceValue),
    Builtin(Builtin),
    Lambda(Arc<Closure>),
    Host(Arc<dyn HostObject>),
}

/// Runtime kind of a value, used for dispatch and renderer lookup.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueKind {
    None,
    Bool,
    Int,
    Float,
    Str,
    List,
    Mapping,
    Slice,
    Builtin,
    Lambda,
    Host,
}

impl ValueKind {
    /// The kind this one specializes, if any. `bool` is an `int`.
    pub const fn parent(self) -> Option<ValueKind> {
        match self {
            ValueKind::Bool => Some(ValueKind::Int),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::None => "NoneType",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::List => "list",
            ValueKind::Mapping => "dict",
            ValueKind::Slice => "slice",
            ValueKind::Builtin => "builtin_function",
            ValueKind::Lambda => "function",
            ValueKind::Host => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn mapping(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Mapping(Arc::new(Mapping::from_entries(entries)))
    }

    pub fn host(object: impl HostObject + 'static) -> Self {
        Value::Host(Arc::new(object))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::Slice(_) => ValueKind::Slice,
            Value::Builtin(_) => ValueKind::Builtin,
            Value::Lambda(_) => ValueKind::Lambda,
            Value::Host(_) => ValueKind::Host,
        }
    }

    /// Type name for error messages. Host objects report their own name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Host(h) => h.type_name(),
            other => other.kind().name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Mapping(m) => !m.is_empty(),
            Value::Slice(_) | Value::Builtin(_) | Value::Lambda(_) => true,
            Value::Host(h) => h.is_truthy(),
        }
    }

    /// Integer view of `int` and `bool`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Numeric view of `int`, `bool` and `float`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            other => other.as_int().map(|n| n as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Quoted rendering used inside collections and diagnostics.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote(s),
            other => other.to_string(),
        }
    }
}

fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Float text: integral values keep a trailing `.0`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        let text = if x > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        format!("{x:?}")
    }
}

/// Plain text rendering: strings unquoted, everything else as written.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&item.repr())?;
                }
                f.write_str("]")
            }
            Value::Mapping(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k.repr(), v.repr())?;
                }
                f.write_str("}")
            }
            Value::Slice(s) => write!(f, "{s}"),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
            Value::Lambda(_) => f.write_str("<lambda>"),
            Value::Host(h) => match h.to_text() {
                Some(text) => f.write_str(&text),
                None => write!(f, "<{} object>", h.type_name()),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Host(h) => write!(f, "Host({h:?})"),
            Value::Lambda(c) => write!(f, "Lambda({c:?})"),
            other => f.write_str(&other.repr()),
        }
    }
}

/// Equality follows the dynamic-language rules: numbers compare by value
/// across `bool`/`int`/`float`, containers compare element-wise, builtins by
/// name, closures by parameters and body, host objects by identity.
impl PartialEq for Value {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Slice(a), Value::Slice(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => {
                Arc::ptr_eq(a, b) || (a.params == b.params && a.body == b.body)
            }
            (Value::Host(a), Value::Host(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(Arc::new(m))
    }
}

impl From<SliceValue> for Value {
    fn from(s: SliceValue) -> Self {
        Value::Slice(s)
    }
}

impl From<Builtin> for Value {
    fn from(b: Builtin) -> Self {
        Value::Builtin(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}
