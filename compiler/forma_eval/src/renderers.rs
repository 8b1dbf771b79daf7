//! Value-to-text conversion for template output.
//!
//! A [`Renderers`] registry is an ordered list of `(RenderKey, RenderFn)`
//! entries. Looking up a value picks the most specific matching key; among
//! equally specific keys, the one registered first wins:
//!
//! 1. [`RenderKey::Host`] naming the host object's type, or
//!    [`RenderKey::Exact`] of the value's own kind
//! 2. [`RenderKey::Kind`] of the value's own kind
//! 3. [`RenderKey::Kind`] of the kind it specializes (`bool` under `int`)
//! 4. [`RenderKey::Any`]
//!
//! The default registry renders `str`, `int` and `float` only, so splicing
//! `None`, a `bool` or a container into text is an error until the caller
//! says how.

use std::fmt;
use std::sync::Arc;

use forma_ir::{Value, ValueKind};

use crate::errors::{missing_renderer, EvalError};

/// Conversion from a resolved value to output text.
pub type RenderFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Which values a renderer applies to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RenderKey {
    /// Values of exactly this kind.
    Exact(ValueKind),
    /// Values of this kind or of a kind that specializes it.
    Kind(ValueKind),
    /// Host objects reporting this type name.
    Host(Arc<str>),
    /// Every value.
    Any,
}

impl RenderKey {
    /// Specificity of this key for `value`; lower is more specific.
    fn rank(&self, value: &Value) -> Option<u8> {
        let kind = value.kind();
        match self {
            RenderKey::Host(name) => match value {
                Value::Host(h) if h.type_name() == &**name => Some(0),
                _ => None,
            },
            RenderKey::Exact(k) => (*k == kind).then_some(0),
            RenderKey::Kind(k) if *k == kind => Some(1),
            RenderKey::Kind(k) => (kind.parent() == Some(*k)).then_some(2),
            RenderKey::Any => Some(3),
        }
    }
}

/// Plain text of a value, as `str()` would produce it.
pub fn display(value: &Value) -> String {
    value.to_string()
}

/// Ordered renderer registry.
#[derive(Clone)]
pub struct Renderers {
    entries: Vec<(RenderKey, RenderFn)>,
}

impl Renderers {
    /// A registry that renders nothing.
    pub fn empty() -> Self {
        Renderers {
            entries: Vec::new(),
        }
    }

    /// Append a renderer. Earlier entries win ties.
    #[must_use]
    pub fn with(
        mut self,
        key: RenderKey,
        render: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.entries.push((key, Arc::new(render)));
        self
    }

    /// Append a renderer that uses the value's plain text.
    #[must_use]
    pub fn with_display(self, key: RenderKey) -> Self {
        self.with(key, display)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The renderer selected for `value`, if any.
    pub fn lookup(&self, value: &Value) -> Option<&RenderFn> {
        self.entries
            .iter()
            .filter_map(|(key, render)| key.rank(value).map(|rank| (rank, render)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, render)| render)
    }

    pub fn render(&self, value: &Value) -> Result<String, EvalError> {
        match self.lookup(value) {
            Some(render) => Ok(render(value)),
            None => Err(missing_renderer(value)),
        }
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Renderers::empty()
            .with_display(RenderKey::Exact(ValueKind::Str))
            .with_display(RenderKey::Exact(ValueKind::Int))
            .with_display(RenderKey::Exact(ValueKind::Float))
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(key, _)| key))
            .finish()
    }
}
