//! Template catalog: template keys mapped to lazily compiled templates.
//!
//! Every key names a [`TemplateRef`]. The first time a key is rendered its
//! text is fetched from the [`TemplateSource`] and compiled into its own
//! [`Tera`] instance; later renders reuse the compiled template. Lookups of
//! unknown keys fail with close-match suggestions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use strsim::levenshtein;
use tera::Tera;

use super::context::TemplateContext;
use super::source::{TemplateRef, TemplateSource};
use crate::build::Markup;
use crate::constants::MAX_TEMPLATE_SUGGESTIONS;
use crate::core::{RenderError, Result};

/// Maximum edit distance, as a percentage of the key length, for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// A compiled template.
#[derive(Debug)]
pub struct Template {
    key: String,
    tera: Tera,
}

impl Template {
    /// Compile `content` under `key`.
    ///
    /// Tera autoescaping is off: escaping is decided per value when the
    /// context is built, so trusted markup passes through untouched.
    pub fn compile(key: &str, content: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(key, content).map_err(|e| RenderError::TemplateLoad {
            key: key.to_string(),
            reason: format_tera_error(&e),
        })?;
        Ok(Self {
            key: key.to_string(),
            tera,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Render with `context`; the raw engine message is returned on failure.
    fn render(&self, context: &TemplateContext) -> std::result::Result<String, String> {
        self.tera.render(&self.key, &context.to_tera()).map_err(|e| format_tera_error(&e))
    }
}

/// Load/compile counters for a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Renders served by an already compiled template
    pub hits: usize,
    /// Templates loaded and compiled
    pub misses: usize,
}

impl CatalogStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// Template keys with their sources and compiled templates.
#[derive(Debug)]
pub struct TemplateCatalog {
    source: Box<dyn TemplateSource>,
    references: IndexMap<String, TemplateRef>,
    compiled: RwLock<HashMap<String, Arc<Template>>>,
    escape: bool,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCatalog {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            references: IndexMap::new(),
            compiled: RwLock::new(HashMap::new()),
            escape: true,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Register `key` as the template at `reference`.
    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, reference: TemplateRef) -> Self {
        self.insert(key, reference);
        self
    }

    /// Enable or disable escaping of plain string values.
    #[must_use]
    pub const fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, reference: TemplateRef) {
        let key = key.into();
        if let Some(previous) = self.references.insert(key.clone(), reference) {
            tracing::debug!("Template key '{key}' re-registered (was {previous})");
        }
    }

    pub const fn escapes(&self) -> bool {
        self.escape
    }

    pub fn contains(&self, key: &str) -> bool {
        self.references.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }

    pub fn reference(&self, key: &str) -> Option<&TemplateRef> {
        self.references.get(key)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Get the compiled template for `key`, loading it on first use.
    ///
    /// # Errors
    ///
    /// - [`RenderError::UnknownTemplate`] if the key is not registered
    /// - [`RenderError::TemplateLoad`] if the source or compiler fails
    pub fn load(&self, key: &str) -> Result<Arc<Template>> {
        if let Some(template) =
            self.compiled.read().unwrap_or_else(PoisonError::into_inner).get(key)
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(template));
        }

        let reference = self.references.get(key).ok_or_else(|| RenderError::UnknownTemplate {
            key: key.to_string(),
            suggestions: self.suggest(key),
        })?;

        let content = self.source.load(key, reference)?;
        let template = Arc::new(Template::compile(key, &content)?);
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Compiled template '{key}' from {reference}");

        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(compiled.entry(key.to_string()).or_insert(template)))
    }

    /// Render the template for `key`.
    ///
    /// `component` is the identity of the top-level component being
    /// materialised; it is carried on render failures.
    ///
    /// # Errors
    ///
    /// Load failures are returned as-is. Engine failures become the
    /// recoverable [`RenderError::TemplateRender`].
    pub fn render(&self, key: &str, context: &TemplateContext, component: &str) -> Result<Markup> {
        let template = self.load(key)?;
        template
            .render(context)
            .map(Markup::trusted)
            .map_err(|message| RenderError::template_render(component, key, message))
    }

    /// Known keys closest to `key`, nearest first.
    fn suggest(&self, key: &str) -> Vec<String> {
        let limit = (key.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        let mut scored: Vec<_> = self
            .references
            .keys()
            .map(|known| (known, levenshtein(key, known)))
            .filter(|(_, distance)| *distance <= limit)
            .collect();
        scored.sort_by_key(|(_, distance)| *distance);
        scored.into_iter().take(MAX_TEMPLATE_SUGGESTIONS).map(|(k, _)| k.clone()).collect()
    }
}

/// Flatten a tera error chain into one readable message.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = Vec::new();
    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        let message = err.to_string();
        let cleaned = message.trim();
        let is_wrapper =
            cleaned.starts_with("Failed to render '") || cleaned.starts_with("Failed to parse '");
        if !cleaned.is_empty() && !is_wrapper && !messages.iter().any(|m| m == cleaned) {
            messages.push(cleaned.to_string());
        }
        current = err.source();
    }

    if messages.is_empty() {
        error.to_string()
    } else {
        messages.join("\n  → ")
    }
}
