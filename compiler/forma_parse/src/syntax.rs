//! Template delimiter configuration.
//!
//! A template uses three kinds of blocks: comments, expression blocks and
//! control ("environment") blocks. Each has an open and a close marker. The
//! template grammar splits literal text at the open markers, so markers must
//! be unambiguous: non-empty, and none may be a prefix of another.

use thiserror::Error;

/// Invalid delimiter configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxConfigError {
    #[error("{role} marker must not be empty")]
    EmptyMarker { role: &'static str },
    #[error("open and close markers must differ, both are {marker:?}")]
    SameOpenClose { marker: String },
    #[error("{first} marker {first_marker:?} overlaps {second} marker {second_marker:?}")]
    Overlap {
        first: &'static str,
        first_marker: String,
        second: &'static str,
        second_marker: String,
    },
}

/// Open/close marker pair of one block kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockSyntaxConfig {
    open: String,
    close: String,
}

impl BlockSyntaxConfig {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, SyntaxConfigError> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() {
            return Err(SyntaxConfigError::EmptyMarker { role: "open" });
        }
        if close.is_empty() {
            return Err(SyntaxConfigError::EmptyMarker { role: "close" });
        }
        if open == close {
            return Err(SyntaxConfigError::SameOpenClose { marker: open });
        }
        Ok(BlockSyntaxConfig { open, close })
    }

    fn unchecked(open: &str, close: &str) -> Self {
        BlockSyntaxConfig {
            open: open.to_string(),
            close: close.to_string(),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

/// Markers for all three block kinds.
///
/// Defaults: `{# #}` comments, `{{ }}` expressions, `{% %}` control blocks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateSyntaxConfig {
    comment: BlockSyntaxConfig,
    expression: BlockSyntaxConfig,
    environment: BlockSyntaxConfig,
}

impl TemplateSyntaxConfig {
    pub fn new(
        comment: BlockSyntaxConfig,
        expression: BlockSyntaxConfig,
        environment: BlockSyntaxConfig,
    ) -> Result<Self, SyntaxConfigError> {
        let config = TemplateSyntaxConfig {
            comment,
            expression,
            environment,
        };
        config.check_overlaps()?;
        Ok(config)
    }

    pub fn builder() -> TemplateSyntaxBuilder {
        TemplateSyntaxBuilder::default()
    }

    pub fn comment(&self) -> &BlockSyntaxConfig {
        &self.comment
    }

    pub fn expression(&self) -> &BlockSyntaxConfig {
        &self.expression
    }

    pub fn environment(&self) -> &BlockSyntaxConfig {
        &self.environment
    }

    /// The three open markers; literal text ends at any of them.
    pub fn open_markers(&self) -> [&str; 3] {
        [
            self.comment.open(),
            self.expression.open(),
            self.environment.open(),
        ]
    }

    fn markers(&self) -> [(&'static str, &str); 6] {
        [
            ("comment open", self.comment.open()),
            ("comment close", self.comment.close()),
            ("expression open", self.expression.open()),
            ("expression close", self.expression.close()),
            ("environment open", self.environment.open()),
            ("environment close", self.environment.close()),
        ]
    }

    fn check_overlaps(&self) -> Result<(), SyntaxConfigError> {
        let markers = self.markers();
        for (i, &(first, a)) in markers.iter().enumerate() {
            for &(second, b) in &markers[i + 1..] {
                if a.starts_with(b) || b.starts_with(a) {
                    return Err(SyntaxConfigError::Overlap {
                        first,
                        first_marker: a.to_string(),
                        second,
                        second_marker: b.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for TemplateSyntaxConfig {
    fn default() -> Self {
        TemplateSyntaxConfig {
            comment: BlockSyntaxConfig::unchecked("{#", "#}"),
            expression: BlockSyntaxConfig::unchecked("{{", "}}"),
            environment: BlockSyntaxConfig::unchecked("{%", "%}"),
        }
    }
}

/// Builder starting from the default markers.
#[derive(Clone, Debug, Default)]
pub struct TemplateSyntaxBuilder {
    comment: Option<(String, String)>,
    expression: Option<(String, String)>,
    environment: Option<(String, String)>,
}

impl TemplateSyntaxBuilder {
    #[must_use]
    pub fn comment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.comment = Some((open.into(), close.into()));
        self
    }

    #[must_use]
    pub fn expression(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.expression = Some((open.into(), close.into()));
        self
    }

    #[must_use]
    pub fn environment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.environment = Some((open.into(), close.into()));
        self
    }

    pub fn build(self) -> Result<TemplateSyntaxConfig, SyntaxConfigError> {
        let defaults = TemplateSyntaxConfig::default();
        let pick = |markers: Option<(String, String)>, fallback: BlockSyntaxConfig| match markers {
            Some((open, close)) => BlockSyntaxConfig::new(open, close),
            None => Ok(fallback),
        };
        TemplateSyntaxConfig::new(
            pick(self.comment, defaults.comment)?,
            pick(self.expression, defaults.expression)?,
            pick(self.environment, defaults.environment)?,
        )
    }
}
