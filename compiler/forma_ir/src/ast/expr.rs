//! Expression nodes.
//!
//! An [`Expr`] is an [`ExprKind`] plus the [`Origin`] where it began. Trees
//! are built once by the parser and then only ever rebuilt, never mutated.

use std::fmt;

use smallvec::SmallVec;

use super::operators::{BinaryOp, UnaryOp};
use crate::origin::Origin;
use crate::value::Value;

/// Names bound by a lambda, a `for` loop or one `with` binding.
pub type Names = SmallVec<[String; 2]>;

/// Expression node.
///
/// Equality compares `kind` only; origins are diagnostic metadata.
#[derive(Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub origin: Origin,
}

/// One `condition => body` arm of an `if`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfCase {
    pub condition: Expr,
    pub body: Expr,
}

/// One `names = value` entry of a `with`.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub names: Names,
    pub value: Expr,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Already resolved value.
    Value(Value),
    /// Free reference to a variable.
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `base[index]`. Slices arrive here as a call to the slice intrinsic.
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Attribute {
        object: Box<Expr>,
        name: String,
    },
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Lambda {
        params: Names,
        body: Box<Expr>,
    },
    /// Ordered cases; the first true condition wins, none true yields `None`.
    If(Vec<IfCase>),
    /// Body evaluated once per destructured item of `iterable`.
    For {
        names: Names,
        iterable: Box<Expr>,
        body: Box<Expr>,
    },
    /// Sequential bindings; later values may refer to earlier names.
    With {
        bindings: Vec<Binding>,
        body: Box<Expr>,
    },
    /// Concatenation of rendered parts.
    Template(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, origin: Origin) -> Self {
        Expr { kind, origin }
    }

    pub fn value(value: impl Into<Value>, origin: Origin) -> Self {
        Expr::new(ExprKind::Value(value.into()), origin)
    }

    pub fn identifier(name: impl Into<String>, origin: Origin) -> Self {
        Expr::new(ExprKind::Identifier(name.into()), origin)
    }

    pub fn unary(op: UnaryOp, operand: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            origin,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            origin,
        )
    }

    pub fn index(base: Expr, index: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            origin,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>, kwargs: Vec<(String, Expr)>, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
                kwargs,
            },
            origin,
        )
    }

    pub fn attribute(object: Expr, name: impl Into<String>, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Attribute {
                object: Box::new(object),
                name: name.into(),
            },
            origin,
        )
    }

    pub fn lambda(params: Names, body: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            origin,
        )
    }

    pub fn for_each(names: Names, iterable: Expr, body: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::For {
                names,
                iterable: Box::new(iterable),
                body: Box::new(body),
            },
            origin,
        )
    }

    pub fn with(bindings: Vec<Binding>, body: Expr, origin: Origin) -> Self {
        Expr::new(
            ExprKind::With {
                bindings,
                body: Box::new(body),
            },
            origin,
        )
    }

    /// The resolved value, if this node is a `Value` leaf.
    #[inline]
    pub fn as_value(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Value(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_value(&self) -> bool {
        matches!(self.kind, ExprKind::Value(_))
    }

    pub fn into_value(self) -> Result<Value, Expr> {
        match self.kind {
            ExprKind::Value(v) => Ok(v),
            kind => Err(Expr {
                kind,
                origin: self.origin,
            }),
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.origin)
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    f.write_str(&names.join(", "))
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }
    Ok(())
}

/// Source-like rendering, parenthesizing every operator application.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Value(v) => write!(f, "{}", v.repr()),
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "(not {operand})"),
                _ => write!(f, "({op}{operand})"),
            },
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            ExprKind::Index { base, index } => write!(f, "{base}[{index}]"),
            ExprKind::Call {
                callee,
                args,
                kwargs,
            } => {
                write!(f, "{callee}(")?;
                write_list(f, args, |f, a| write!(f, "{a}"))?;
                if !args.is_empty() && !kwargs.is_empty() {
                    f.write_str(", ")?;
                }
                write_list(f, kwargs, |f, (k, v)| write!(f, "{k}={v}"))?;
                f.write_str(")")
            }
            ExprKind::Attribute { object, name } => write!(f, "{object}.{name}"),
            ExprKind::List(items) => {
                f.write_str("[")?;
                write_list(f, items, |f, e| write!(f, "{e}"))?;
                f.write_str("]")
            }
            ExprKind::Dict(entries) => {
                f.write_str("{")?;
                write_list(f, entries, |f, (k, v)| write!(f, "{k}: {v}"))?;
                f.write_str("}")
            }
            ExprKind::Lambda { params, body } => {
                f.write_str("(lambda ")?;
                write_names(f, params)?;
                write!(f, ": {body})")
            }
            ExprKind::If(cases) => {
                f.write_str("if(")?;
                write_list(f, cases, |f, c| write!(f, "{} => {}", c.condition, c.body))?;
                f.write_str(")")
            }
            ExprKind::For {
                names,
                iterable,
                body,
            } => {
                f.write_str("for(")?;
                write_names(f, names)?;
                write!(f, " in {iterable} => {body})")
            }
            ExprKind::With { bindings, body } => {
                f.write_str("with(")?;
                write_list(f, bindings, |f, b| {
                    write_names(f, &b.names)?;
                    write!(f, " = {}", b.value)
                })?;
                write!(f, " => {body})")
            }
            ExprKind::Template(parts) => {
                f.write_str("template(")?;
                write_list(f, parts, |f, e| write!(f, "{e}"))?;
                f.write_str(")")
            }
        }
    }
}
