//! Binary and unary operators.
//!
//! The operator set mirrors a conventional dynamic language: arithmetic,
//! bitwise, shifts, membership, comparisons and short-circuit booleans.

use std::fmt;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Pow,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    MatMul,

    // Bitwise
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,

    // Membership
    In,
    NotIn,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Every operator, in no particular order.
    pub const ALL: [BinaryOp; 23] = [
        Self::Pow,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::FloorDiv,
        Self::Mod,
        Self::MatMul,
        Self::BitOr,
        Self::BitXor,
        Self::BitAnd,
        Self::Shl,
        Self::Shr,
        Self::In,
        Self::NotIn,
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::LtEq,
        Self::Gt,
        Self::GtEq,
        Self::And,
        Self::Or,
    ];

    /// Returns the source-level symbol for this operator.
    ///
    /// Used by the grammar and in error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Pow => "**",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::MatMul => "@",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Inverse of [`BinaryOp::as_symbol`].
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_symbol() == symbol)
    }

    /// Operators that take part in chained comparisons (`a < b <= c`).
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// `and` / `or`, which may fold from their left operand alone.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Operators spelled with letters; they need a word boundary after them.
    pub const fn is_word(self) -> bool {
        matches!(self, Self::In | Self::NotIn | Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Pos,
    Neg,
    Invert,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Invert => "~",
            Self::Not => "not",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        [Self::Pos, Self::Neg, Self::Invert, Self::Not]
            .into_iter()
            .find(|op| op.as_symbol() == symbol)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
