//! Template sources.
//!
//! A [`TemplateSource`] turns a [`TemplateRef`] into raw template text. The
//! catalog asks for a template only the first time its key is used.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::constants::DEFAULT_TEMPLATE_SUFFIX;
use crate::core::{RenderError, Result};

/// Where a template lives: a namespace plus a template name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateRef {
    pub namespace: String,
    pub name: String,
}

impl TemplateRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.namespace, self.name)
    }
}

/// Produces raw template content.
pub trait TemplateSource: fmt::Debug + Send + Sync {
    /// Load the template text for `reference`.
    ///
    /// `key` is the catalog key being loaded, for error messages.
    fn load(&self, key: &str, reference: &TemplateRef) -> Result<String>;
}

/// A template directory with its file suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDir {
    pub path: PathBuf,
    pub suffix: String,
}

impl NamespaceDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

/// Loads templates from namespaced directories on disk.
#[derive(Debug, Clone, Default)]
pub struct DirectorySource {
    namespaces: HashMap<String, NamespaceDir>,
}

impl DirectorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>, dir: NamespaceDir) -> Self {
        self.namespaces.insert(namespace.into(), dir);
        self
    }

    /// Path of the file backing `reference`, if its namespace is known.
    pub fn path_for(&self, reference: &TemplateRef) -> Option<PathBuf> {
        let dir = self.namespaces.get(&reference.namespace)?;
        Some(dir.path.join(format!("{}{}", reference.name, dir.suffix)))
    }
}

impl TemplateSource for DirectorySource {
    fn load(&self, key: &str, reference: &TemplateRef) -> Result<String> {
        let path = self.path_for(reference).ok_or_else(|| RenderError::TemplateLoad {
            key: key.to_string(),
            reason: format!("unknown template namespace '{}'", reference.namespace),
        })?;
        tracing::debug!("Loading template '{key}' from {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| RenderError::TemplateLoad {
            key: key.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// Templates held in memory, keyed by `namespace/name`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<TemplateRef, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_template(mut self, reference: TemplateRef, content: impl Into<String>) -> Self {
        self.templates.insert(reference, content.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, key: &str, reference: &TemplateRef) -> Result<String> {
        self.templates.get(reference).cloned().ok_or_else(|| RenderError::TemplateLoad {
            key: key.to_string(),
            reason: format!("no in-memory template for {reference}"),
        })
    }
}
