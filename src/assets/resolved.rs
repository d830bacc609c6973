//! Resolved bundle assets and page asset collection.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;

use super::bundle::{FileDefinition, FileSet, merge_first_wins};

/// The transitive, deduplicated file set of one bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAssets {
    pub css: FileSet,
    pub js: FileSet,
}

impl ResolvedAssets {
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }

    /// Merge `other` in, keeping existing definitions on path conflicts.
    pub fn merge(&mut self, other: &Self) {
        merge_first_wins(&mut self.css, &other.css);
        merge_first_wins(&mut self.js, &other.js);
    }
}

/// Resolved assets for every declared bundle.
///
/// Computed once from the bundle declarations and reused by every render
/// pass of the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLibraries {
    bundles: IndexMap<String, ResolvedAssets>,
}

impl ResolvedLibraries {
    pub(crate) fn new(bundles: IndexMap<String, ResolvedAssets>) -> Self {
        Self { bundles }
    }

    pub fn get(&self, bundle: &str) -> Option<&ResolvedAssets> {
        self.bundles.get(bundle)
    }

    pub fn contains(&self, bundle: &str) -> bool {
        self.bundles.contains_key(bundle)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Collect the files a page needs from the bundles it touched.
    ///
    /// Bundles are merged in the given order and the first definition of a
    /// path wins. Bundles with no declaration contribute nothing.
    pub fn collect<'a, I>(&self, touched: I) -> PageAssets
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut merged = ResolvedAssets::default();
        for bundle in touched {
            match self.bundles.get(bundle) {
                Some(assets) => merged.merge(assets),
                None => tracing::warn!("Attached bundle '{bundle}' has no declaration"),
            }
        }
        PageAssets::number(&merged)
    }
}

/// Which kind of element a page asset becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
}

impl AssetKind {
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Attribute carrying the asset URL in the page template.
    pub const fn url_attribute(self) -> &'static str {
        match self {
            Self::Css => "href",
            Self::Js => "src",
        }
    }
}

/// One file placed on a generated page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageAsset {
    pub kind: AssetKind,
    /// Path as declared in the bundle.
    pub source: String,
    /// Page-relative path, `css/{n}-{basename}` or `js/{n}-{basename}`.
    pub public_path: String,
    pub definition: FileDefinition,
}

impl PageAsset {
    /// Template value: the URL attribute plus the file's attributes and options.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(self.kind.url_attribute().to_string(), Value::String(self.public_path.clone()));
        object.insert(
            "attributes".to_string(),
            Value::Object(self.definition.attributes.clone().into_iter().collect()),
        );
        for (name, value) in &self.definition.options {
            object.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(object)
    }
}

/// The CSS and JS files of a page, numbered in merge order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAssets {
    pub css: Vec<PageAsset>,
    pub js: Vec<PageAsset>,
}

impl PageAssets {
    fn number(assets: &ResolvedAssets) -> Self {
        Self {
            css: number_files(AssetKind::Css, &assets.css),
            js: number_files(AssetKind::Js, &assets.js),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageAsset> {
        self.css.iter().chain(&self.js)
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}

fn number_files(kind: AssetKind, files: &FileSet) -> Vec<PageAsset> {
    files
        .iter()
        .enumerate()
        .map(|(i, (path, definition))| {
            let basename =
                Path::new(path).file_name().map_or_else(|| path.clone(), |n| n.to_string_lossy().into_owned());
            PageAsset {
                kind,
                source: path.clone(),
                public_path: format!("{}/{}-{basename}", kind.dir(), i + 1),
                definition: definition.clone(),
            }
        })
        .collect()
}
