//! Evaluation errors.
//!
//! Every failure raised while simplifying or evaluating an expression is an
//! [`EvalError`]: a structured [`EvalErrorKind`], the message derived from it,
//! the origin of the node where the fault happened, and optional notes.
//!
//! Factory functions (`division_by_zero()`, `unresolved_identifiers(..)`, ...)
//! are the public way to build errors, so message wording lives in one place.

use std::collections::BTreeSet;
use std::fmt;

use forma_ir::{BinaryOp, NativeError, Origin, UnaryOp, Value};
use thiserror::Error;

/// Result of evaluating to a value.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    // Operators
    #[error("unsupported operand types for `{op}`: '{left}' and '{right}'")]
    InvalidBinaryOp {
        op: BinaryOp,
        left: String,
        right: String,
    },
    #[error("bad operand type for unary `{op}`: '{operand}'")]
    InvalidUnaryOp { op: UnaryOp, operand: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },
    #[error("{operation} result of length {len} exceeds the limit of {limit}")]
    SequenceTooLarge {
        operation: String,
        len: u128,
        limit: usize,
    },

    // Access
    #[error("'{type_name}' object is not subscriptable")]
    NotIndexable { type_name: String },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("key not found: {key}")]
    KeyNotFound { key: String },
    #[error("'{type_name}' object has no attribute '{name}'")]
    NoSuchAttribute { type_name: String, name: String },
    #[error("'{type_name}' object is not iterable")]
    NotIterable { type_name: String },

    // Calls
    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: String },
    #[error("{name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("{name}: {message}")]
    BadArgument { name: String, message: String },

    // Bindings
    #[error("cannot unpack {got} value(s) into {expected} name(s)")]
    DestructureArity { expected: usize, got: usize },
    #[error("cannot unpack non-iterable '{type_name}' into {expected} names")]
    DestructureType { type_name: String, expected: usize },
    #[error("name '{name}' is bound more than once")]
    DuplicateBinding { name: String },

    // Rendering
    #[error("no renderer for value of type '{type_name}'")]
    MissingRenderer { type_name: String },
    #[error("unresolved identifiers: {}", join(.names))]
    UnresolvedIdentifiers { names: BTreeSet<String> },

    // Host objects
    #[error("{type_name}: {message}")]
    Host { type_name: String, message: String },

    #[error("{message}")]
    Custom { message: String },
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Error raised by simplify or evaluate.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message, equal to `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Origin of the innermost node that failed.
    pub origin: Option<Origin>,
    /// Secondary context, rendered after the message.
    pub notes: Vec<String>,
}

impl EvalError {
    /// An error with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            origin: None,
            notes: Vec::new(),
        }
    }

    /// Attach `origin`, replacing any previous one.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Attach `origin` unless a deeper node already did.
    #[must_use]
    pub fn or_origin(mut self, origin: &Origin) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin.clone());
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Whether this only reports missing variables.
    ///
    /// Unlike every other kind, supplying more variables and retrying can
    /// make the same expression succeed.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.kind, EvalErrorKind::UnresolvedIdentifiers { .. })
    }

    /// The missing names, if this is an unresolved-identifier error.
    pub fn unresolved_names(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            EvalErrorKind::UnresolvedIdentifiers { names } => Some(names),
            _ => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{origin}: ")?;
        }
        f.write_str(&self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// Operator errors

/// Operator applied to a pair of incompatible operands.
#[cold]
pub fn invalid_binary_op(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp {
        op,
        left: left.type_name().to_string(),
        right: right.type_name().to_string(),
    })
    .with_note(format!("operands were {} and {}", left.repr(), right.repr()))
}

#[cold]
pub fn invalid_unary_op(op: UnaryOp, operand: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidUnaryOp {
        op,
        operand: operand.type_name().to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn sequence_too_large(operation: &str, len: u128, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SequenceTooLarge {
        operation: operation.to_string(),
        len,
        limit,
    })
}

// Access errors

#[cold]
pub fn not_indexable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIndexable {
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index, len })
}

#[cold]
pub fn key_not_found(key: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound { key: key.repr() })
}

#[cold]
pub fn no_such_attribute(value: &Value, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchAttribute {
        type_name: value.type_name().to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn not_iterable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIterable {
        type_name: value.type_name().to_string(),
    })
}

// Call errors

#[cold]
pub fn not_callable(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: impl ToString, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got,
    })
}

#[cold]
pub fn bad_argument(name: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BadArgument {
        name: name.to_string(),
        message: message.into(),
    })
}

// Binding errors

#[cold]
pub fn destructure_arity(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DestructureArity { expected, got })
}

#[cold]
pub fn destructure_type(value: &Value, expected: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DestructureType {
        type_name: value.type_name().to_string(),
        expected,
    })
}

#[cold]
pub fn duplicate_binding(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateBinding {
        name: name.to_string(),
    })
}

// Rendering errors

#[cold]
pub fn missing_renderer(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingRenderer {
        type_name: value.type_name().to_string(),
    })
}

#[cold]
pub fn unresolved_identifiers(names: BTreeSet<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnresolvedIdentifiers { names })
}

// Native code

#[cold]
pub fn host_error(type_name: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host {
        type_name: type_name.to_string(),
        message: message.into(),
    })
}

/// Wrap an evaluation error so native code can return it.
pub fn into_native(error: EvalError) -> NativeError {
    NativeError::Nested(Box::new(error))
}

/// Convert a failure from builtin `name` into an evaluation error.
///
/// Errors that started as [`EvalError`]s (a lambda called from `sorted`, say)
/// come back unchanged.
pub fn from_native(error: NativeError, name: &str) -> EvalError {
    match error {
        NativeError::Unsupported => bad_argument(name, "operation not supported"),
        NativeError::Arity { expected, got } => arity_mismatch(name, expected, got),
        NativeError::UnexpectedKeyword(keyword) => {
            bad_argument(name, format!("unexpected keyword argument '{keyword}'"))
        }
        NativeError::Failed(message) => bad_argument(name, message),
        NativeError::Nested(inner) => match inner.downcast::<EvalError>() {
            Ok(error) => *error,
            Err(other) => EvalError::new(other.to_string()),
        },
    }
}
