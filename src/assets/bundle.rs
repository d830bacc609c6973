//! Asset bundle declarations.
//!
//! A bundle is a named group of CSS and JS files plus the names of the
//! bundles it depends on. File sets are keyed by path and keep declaration
//! order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata for one CSS or JS file.
///
/// `attributes` end up on the generated `<link>` / `<script>` element; any
/// other keys are kept as opaque options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDefinition {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, serde_json::Value>,
    #[serde(flatten)]
    pub options: IndexMap<String, serde_json::Value>,
}

impl FileDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// File definitions keyed by file path.
pub type FileSet = IndexMap<String, FileDefinition>;

/// Merge `from` into `into`, keeping the existing definition for any path
/// already present.
pub(crate) fn merge_first_wins(into: &mut FileSet, from: &FileSet) {
    for (path, definition) in from {
        into.entry(path.clone()).or_insert_with(|| definition.clone());
    }
}

/// A declared asset bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetBundle {
    /// Names of bundles this one depends on, in declaration order.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub css: FileSet,
    #[serde(default)]
    pub js: FileSet,
}

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dependency(mut self, bundle: impl Into<String>) -> Self {
        self.depends_on.push(bundle.into());
        self
    }

    #[must_use]
    pub fn with_css(mut self, path: impl Into<String>, definition: FileDefinition) -> Self {
        self.css.insert(path.into(), definition);
        self
    }

    #[must_use]
    pub fn with_js(mut self, path: impl Into<String>, definition: FileDefinition) -> Self {
        self.js.insert(path.into(), definition);
        self
    }
}

/// Bundle declarations keyed by bundle name.
pub type BundleDeclarations = IndexMap<String, AssetBundle>;
