//! Callables and host objects.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::Value;
use crate::ast::{BinaryOp, Expr, Names};

/// Failure reported by native code (builtins and host objects).
#[derive(Debug, Error)]
pub enum NativeError {
    /// The receiver does not offer this capability at all.
    #[error("operation not supported")]
    Unsupported,
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: String, got: usize },
    #[error("unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),
    #[error("{0}")]
    Failed(String),
    /// An error raised while evaluating template code from native code
    /// (for example a lambda passed to `sorted`).
    #[error(transparent)]
    Nested(Box<dyn std::error::Error + Send + Sync>),
}

impl NativeError {
    pub fn failed(message: impl Into<String>) -> Self {
        NativeError::Failed(message.into())
    }
}

pub type NativeResult = Result<Value, NativeError>;

/// Calls back into the evaluator from native code, for example to apply the
/// `key` function `sorted` was given.
pub trait Invoke {
    fn invoke(&self, callee: &Value, args: &[Value]) -> NativeResult;
}

/// Signature of a native function: positional and keyword arguments, and a
/// way to call template values back.
pub type NativeFn =
    dyn Fn(&[Value], &[(String, Value)], &dyn Invoke) -> NativeResult + Send + Sync;

/// Named native function, optionally bound to the value it was looked up on.
///
/// Builtins compare equal by name and receiver, so every builtin registered
/// under one name must behave identically for equal receivers.
#[derive(Clone)]
pub struct Builtin {
    name: Arc<str>,
    receiver: Option<Arc<Value>>,
    func: Arc<NativeFn>,
}

impl Builtin {
    pub fn new(
        name: impl Into<Arc<str>>,
        func: impl Fn(&[Value], &[(String, Value)], &dyn Invoke) -> NativeResult
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Builtin {
            name: name.into(),
            receiver: None,
            func: Arc::new(func),
        }
    }

    /// The same function, bound to `receiver` (as in `receiver.name`).
    #[must_use]
    pub fn bound_to(mut self, receiver: Value) -> Self {
        self.receiver = Some(Arc::new(receiver));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_deref()
    }

    pub fn call(
        &self,
        args: &[Value],
        kwargs: &[(String, Value)],
        invoke: &dyn Invoke,
    ) -> NativeResult {
        (self.func)(args, kwargs, invoke)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.receiver == other.receiver
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "<builtin {} of {}>", self.name, receiver.repr()),
            None => write!(f, "<builtin {}>", self.name),
        }
    }
}

/// A lambda whose body has no free identifiers besides its parameters.
#[derive(Clone, Debug)]
pub struct Closure {
    pub params: Names,
    pub body: Expr,
}

/// Capabilities a host application can expose on its own objects.
///
/// Every hook defaults to [`NativeError::Unsupported`]; the evaluator turns
/// that into a typed error naming the operation and [`HostObject::type_name`].
pub trait HostObject: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn attribute(&self, _name: &str) -> NativeResult {
        Err(NativeError::Unsupported)
    }

    fn index(&self, _index: &Value) -> NativeResult {
        Err(NativeError::Unsupported)
    }

    fn call(&self, _args: &[Value], _kwargs: &[(String, Value)]) -> NativeResult {
        Err(NativeError::Unsupported)
    }

    /// `self op other`, or `other op self` when `reflected` is set.
    fn binary_op(&self, _op: BinaryOp, _other: &Value, _reflected: bool) -> NativeResult {
        Err(NativeError::Unsupported)
    }

    /// Text used when the object is rendered or converted with `str()`.
    fn to_text(&self) -> Option<String> {
        None
    }

    fn is_truthy(&self) -> bool {
        true
    }
}
