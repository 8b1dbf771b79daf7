//! Source positions for diagnostics.

use std::fmt;
use std::sync::Arc;

/// Name used for sources that were not loaded from a file.
pub const ANONYMOUS_SOURCE: &str = "<string>";

/// Where an expression node started in its template source.
///
/// `line` and `column` are 1-based and count characters, not bytes.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Origin {
    pub line: u32,
    pub column: u32,
    pub source_id: Arc<str>,
}

impl Origin {
    pub fn new(line: u32, column: u32, source_id: impl Into<Arc<str>>) -> Self {
        Origin {
            line,
            column,
            source_id: source_id.into(),
        }
    }

    /// Origin for nodes that do not correspond to source text (host-built trees, tests).
    pub fn synthetic() -> Self {
        Origin::new(1, 1, ANONYMOUS_SOURCE)
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::synthetic()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_id, self.line, self.column)
    }
}
