//! Forma - templates with partial evaluation.
//!
//! This is the crate applications depend on. It ties the parser
//! (`forma_parse`) and the evaluator (`forma_eval`) together behind two
//! types:
//!
//! - [`Template`]: a parsed template. Substituting variables yields another
//!   template with everything that could be computed folded into text;
//!   rendering additionally requires that nothing is left over.
//! - [`TemplateContext`]: default variables, renderers and syntax shared by
//!   many templates, plus a cache of templates loaded from disk.
//!
//! ```text
//! source ──parse──▶ Template ──substitute(vars)──▶ Template ──render──▶ String
//! ```
//!
//! # Logging
//!
//! Entry points emit `tracing` spans. Call [`init_tracing`] and set
//! `RUST_LOG` (e.g. `RUST_LOG=forma=debug,forma_parse=trace`) to see them.

mod context;
mod error;
mod template;

pub use context::TemplateContext;
pub use error::{Error, Result};
pub use template::Template;

pub use forma_eval::{
    default_variables, evaluate, identifiers, simplify, EvalError, EvalErrorKind, RenderKey,
    Renderers, Variables,
};
pub use forma_ir::{Expr, ExprKind, HostObject, Origin, Value, ValueKind};
pub use forma_parse::{
    parse_expression, BlockSyntaxConfig, ParseError, Segment, SyntaxConfigError,
    TemplateSyntaxBuilder, TemplateSyntaxConfig,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Parse `source` as a template and return its root expression.
///
/// The result feeds [`identifiers`], [`simplify`] and [`evaluate`]; a fully
/// evaluated template root is a string value.
pub fn parse(source: &str, syntax: &TemplateSyntaxConfig) -> Result<Expr, ParseError> {
    Template::parse(source, syntax).map(|template| template.to_expression())
}

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
