//! Errors surfaced by the facade.

use std::path::PathBuf;

use forma_eval::EvalError;
use forma_parse::{ParseError, SyntaxConfigError};
use thiserror::Error;

/// Any failure from parsing, configuring, loading or rendering a template.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid template syntax: {0}")]
    Syntax(#[from] SyntaxConfigError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("cannot read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether rendering failed only because variables were missing.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::Eval(e) if e.is_unresolved())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
