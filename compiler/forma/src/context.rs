//! Shared configuration and cached template loading.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use forma_eval::{default_variables, EvalError, Renderers, Variables};
use forma_parse::TemplateSyntaxConfig;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::template::Template;

/// Defaults applied to every template handled through this context.
///
/// Default variables sit underneath the caller's variables: a name the
/// caller passes wins over a default with the same name.
pub struct TemplateContext {
    base_dir: Option<PathBuf>,
    variables: Variables,
    renderers: Renderers,
    syntax: TemplateSyntaxConfig,
    cache: Mutex<FxHashMap<PathBuf, Arc<Template>>>,
}

impl TemplateContext {
    /// A context with the builtin functions as default variables.
    pub fn new() -> Self {
        Self::with_defaults(default_variables())
    }

    /// A context with only `variables` as defaults; no builtins.
    pub fn with_defaults(variables: Variables) -> Self {
        TemplateContext {
            base_dir: None,
            variables,
            renderers: Renderers::default(),
            syntax: TemplateSyntaxConfig::default(),
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Resolve relative template paths against `dir`.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Add or replace default variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables.extend(variables);
        self
    }

    #[must_use]
    pub fn with_renderers(mut self, renderers: Renderers) -> Self {
        self.renderers = renderers;
        self
    }

    /// Syntax for templates loaded from now on. Clears the load cache.
    #[must_use]
    pub fn with_syntax(mut self, syntax: TemplateSyntaxConfig) -> Self {
        self.syntax = syntax;
        self.cache.get_mut().clear();
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn default_variables(&self) -> &Variables {
        &self.variables
    }

    pub fn renderers(&self) -> &Renderers {
        &self.renderers
    }

    pub fn syntax(&self) -> &TemplateSyntaxConfig {
        &self.syntax
    }

    /// `path` joined onto the base directory unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Parse `path` with this context's syntax.
    ///
    /// Each resolved path is read once; later calls return the same
    /// template.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_template(&self, path: impl AsRef<Path>) -> Result<Arc<Template>> {
        let resolved = self.resolve(path.as_ref());

        if let Some(template) = self.cache.lock().get(&resolved) {
            tracing::debug!("template cache hit");
            return Ok(Arc::clone(template));
        }

        tracing::debug!(resolved = %resolved.display(), "template cache miss");
        let source = std::fs::read_to_string(&resolved).map_err(|source| Error::Io {
            path: resolved.clone(),
            source,
        })?;
        let source_id = resolved.display().to_string();
        let template = Arc::new(Template::parse_named(&source, &source_id, &self.syntax)?);

        // Another thread may have loaded the same file meanwhile; keep its copy.
        let mut cache = self.cache.lock();
        Ok(Arc::clone(cache.entry(resolved).or_insert(template)))
    }

    /// Names `template` still needs once the defaults are applied.
    pub fn identifiers(&self, template: &Template) -> BTreeSet<String> {
        template
            .identifiers()
            .into_iter()
            .filter(|name| !self.variables.contains_key(name))
            .collect()
    }

    /// [`Template::substitute`] with the defaults underneath `variables`.
    pub fn substitute(
        &self,
        template: &Template,
        variables: &Variables,
        keep_comments: bool,
    ) -> Result<Template, EvalError> {
        template.substitute(&self.merged(variables), keep_comments, &self.renderers)
    }

    /// [`Template::render`] with the defaults underneath `variables`.
    pub fn render(&self, template: &Template, variables: &Variables) -> Result<String, EvalError> {
        template.render(&self.merged(variables), &self.renderers)
    }

    fn merged<'a>(&'a self, variables: &'a Variables) -> Cow<'a, Variables> {
        if variables.is_empty() {
            return Cow::Borrowed(&self.variables);
        }
        if self.variables.is_empty() {
            return Cow::Borrowed(variables);
        }
        let mut merged = self.variables.clone();
        merged.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        Cow::Owned(merged)
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateContext")
            .field("base_dir", &self.base_dir)
            .field("variables", &self.variables.len())
            .field("renderers", &self.renderers.len())
            .field("syntax", &self.syntax)
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_paths_join_the_base_dir() {
        let context = TemplateContext::new().with_base_dir("/srv/templates");
        assert_eq!(
            context.resolve(Path::new("page.txt")),
            PathBuf::from("/srv/templates/page.txt")
        );
        assert_eq!(context.resolve(Path::new("/etc/x")), PathBuf::from("/etc/x"));
        assert_eq!(
            TemplateContext::new().resolve(Path::new("page.txt")),
            PathBuf::from("page.txt")
        );
    }

    #[test]
    fn caller_variables_override_defaults() {
        let mut defaults = Variables::default();
        defaults.insert("a".to_string(), forma_ir::Value::Int(1));
        defaults.insert("b".to_string(), forma_ir::Value::Int(2));
        let context = TemplateContext::with_defaults(defaults);

        let mut vars = Variables::default();
        vars.insert("b".to_string(), forma_ir::Value::Int(3));
        let merged = context.merged(&vars);
        assert_eq!(merged["a"], forma_ir::Value::Int(1));
        assert_eq!(merged["b"], forma_ir::Value::Int(3));
    }
}
