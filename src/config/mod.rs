//! Project configuration (`ids-render.toml`).
//!
//! The project file declares where templates live, how each component maps
//! onto a template, the asset bundles and where output goes:
//!
//! ```toml
//! [templates]
//! default_suffix = ".html.tera"
//! autoescape = true
//!
//! [templates.namespaces]
//! common = "templates/common"
//! mixtape = { path = "templates/mixtape", suffix = ".tera" }
//!
//! [components.card]
//! namespace = "common"
//! slots = ["title", "bodyText"]
//! renames = { bodyText = "content" }
//! bundles = ["core/card"]
//!
//! [bundles."core/card"]
//! depends_on = ["core/base"]
//! css = { "/css/card.css" = { attributes = { media = "all" } } }
//!
//! [output]
//! html = "output/html"
//! snapshots = "output/snapshots"
//! assets_root = "."
//! page_template = "common/page"
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file, after `~` and environment variable expansion.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::BundleDeclarations;
use crate::build::{ComponentDefinition, ComponentDefinitions};
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_TEMPLATE_SUFFIX, SCENARIO_FILE_NAME};
use crate::core::RenderError;
use crate::render::RenderBox;
use crate::templating::{DirectorySource, NamespaceDir, TemplateCatalog, TemplateRef};

/// The whole project file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Component identity -> template mapping.
    #[serde(default)]
    pub components: IndexMap<String, ComponentConfig>,
    #[serde(default)]
    pub bundles: BundleDeclarations,
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    #[serde(default = "default_suffix")]
    pub default_suffix: String,
    /// Escape plain string values; rendered markup is never escaped.
    #[serde(default = "default_true")]
    pub autoescape: bool,
    #[serde(default)]
    pub namespaces: IndexMap<String, NamespaceConfig>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            default_suffix: default_suffix(),
            autoescape: true,
            namespaces: IndexMap::new(),
        }
    }
}

fn default_suffix() -> String {
    DEFAULT_TEMPLATE_SUFFIX.to_string()
}

const fn default_true() -> bool {
    true
}

/// A template namespace: a directory, optionally with its own suffix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NamespaceConfig {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        suffix: Option<String>,
    },
}

impl NamespaceConfig {
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::Detailed { path, .. } => path,
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Detailed { suffix, .. } => suffix.as_deref(),
        }
    }
}

/// How one component is themed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub namespace: String,
    /// Template name inside the namespace; defaults to the component name.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(default)]
    pub renames: HashMap<String, String>,
    #[serde(default)]
    pub bundles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_html_dir")]
    pub html: String,
    #[serde(default = "default_snapshot_dir")]
    pub snapshots: String,
    /// Declared asset paths are relative to this directory.
    #[serde(default = "default_assets_root")]
    pub assets_root: String,
    /// `namespace/name`, or a name in the first namespace.
    #[serde(default)]
    pub page_template: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: default_html_dir(),
            snapshots: default_snapshot_dir(),
            assets_root: default_assets_root(),
            page_template: None,
        }
    }
}

fn default_html_dir() -> String {
    "output/html".to_string()
}

fn default_snapshot_dir() -> String {
    "output/snapshots".to_string()
}

fn default_assets_root() -> String {
    ".".to_string()
}

impl ProjectConfig {
    /// Locate the project file: `explicit` if given, else `ids-render.toml`
    /// in the current directory.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()
                .context("Failed to determine current directory")?
                .join(CONFIG_FILE_NAME),
        };
        if !path.is_file() {
            return Err(RenderError::Config {
                message: format!("no project file at {}", path.display()),
            }
            .into());
        }
        Ok(path)
    }

    /// Read, parse and validate a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let root = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::parse(&content, root)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate project TOML, resolving paths against `root`.
    pub fn parse(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(RenderError::from)?;
        config.root = root.into();
        config.validate()?;
        Ok(config)
    }

    /// Check cross references between sections.
    pub fn validate(&self) -> std::result::Result<(), RenderError> {
        let config_error = |message: String| RenderError::Config { message };

        for (name, component) in &self.components {
            if !self.templates.namespaces.contains_key(&component.namespace) {
                return Err(config_error(format!(
                    "component '{name}' uses undeclared template namespace '{}'",
                    component.namespace
                )));
            }
            for slot in component.renames.keys() {
                if !component.slots.contains(slot) {
                    return Err(config_error(format!(
                        "component '{name}' renames undeclared slot '{slot}'"
                    )));
                }
            }
        }
        for definition in self.component_definitions().iter() {
            definition.variables().map_err(|reason| {
                config_error(format!("component '{}': {reason}", definition.name))
            })?;
        }

        if let Some(page) = &self.output.page_template {
            let reference = self.page_template_ref(page).ok_or_else(|| {
                config_error(format!("page template '{page}' is not in a declared namespace"))
            })?;
            tracing::debug!("Page template resolves to {reference}");
        }
        Ok(())
    }

    fn page_template_ref(&self, page: &str) -> Option<TemplateRef> {
        if let Some((namespace, name)) = page.split_once('/')
            && self.templates.namespaces.contains_key(namespace)
        {
            return Some(TemplateRef::new(namespace, name));
        }
        let (first, _) = self.templates.namespaces.first()?;
        Some(TemplateRef::new(first.clone(), page))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand `~` and environment variables, then resolve against the root.
    pub fn resolve_path(&self, raw: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand path '{raw}'"))?;
        let path = PathBuf::from(expanded.into_owned());
        Ok(if path.is_absolute() { path } else { self.root.join(path) })
    }

    pub fn html_dir(&self) -> Result<PathBuf> {
        self.resolve_path(&self.output.html)
    }

    pub fn snapshot_dir(&self) -> Result<PathBuf> {
        self.resolve_path(&self.output.snapshots)
    }

    pub fn assets_root(&self) -> Result<PathBuf> {
        self.resolve_path(&self.output.assets_root)
    }

    /// Default scenario file beside the project file.
    pub fn scenario_file(&self) -> PathBuf {
        self.root.join(SCENARIO_FILE_NAME)
    }

    /// Component definitions in declaration order.
    pub fn component_definitions(&self) -> ComponentDefinitions {
        self.components
            .iter()
            .map(|(name, component)| {
                let mut definition = ComponentDefinition::new(name.clone())
                    .with_slots(component.slots.iter().cloned())
                    .with_bundles(component.bundles.iter().cloned());
                for (slot, to) in &component.renames {
                    definition = definition.with_rename(slot.clone(), to.clone());
                }
                definition
            })
            .collect()
    }

    /// Template catalog over the configured namespaces.
    ///
    /// Every component identity is a key, as is the page template.
    pub fn template_catalog(&self) -> Result<TemplateCatalog> {
        let mut source = DirectorySource::new();
        for (namespace, config) in &self.templates.namespaces {
            let dir = NamespaceDir::new(self.resolve_path(config.path())?)
                .with_suffix(config.suffix().unwrap_or(&self.templates.default_suffix));
            source = source.with_namespace(namespace.clone(), dir);
        }

        let mut catalog = TemplateCatalog::new(source).with_escape(self.templates.autoescape);
        for (name, component) in &self.components {
            let template = component.template.as_deref().unwrap_or(name);
            catalog.insert(name.clone(), TemplateRef::new(component.namespace.clone(), template));
        }
        if let Some(page) = &self.output.page_template
            && let Some(reference) = self.page_template_ref(page)
        {
            catalog.insert(page.clone(), reference);
        }
        Ok(catalog)
    }

    /// Assemble the render box for this project.
    pub fn render_box(&self) -> Result<RenderBox> {
        let render_box = RenderBox::from_declarations(
            self.component_definitions(),
            self.template_catalog()?,
            self.bundles.clone(),
        )
        .context("Failed to resolve asset bundles")?;
        Ok(match &self.output.page_template {
            Some(page) => render_box.with_page_template(page.clone()),
            None => render_box,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[templates]
autoescape = true

[templates.namespaces]
common = "templates/common"
mixtape = { path = "templates/mixtape", suffix = ".tera" }

[components.card]
namespace = "common"
slots = ["title", "bodyText"]
renames = { bodyText = "content" }
bundles = ["core/card"]

[components.hero]
namespace = "mixtape"
template = "hero-banner"

[bundles."core/card"]
depends_on = ["core/base"]
css = { "/css/card.css" = { attributes = { media = "all" } } }

[output]
page_template = "page"
"#;

    #[test]
    fn test_parse_project() {
        let config = ProjectConfig::parse(PROJECT, "/project").unwrap();
        assert_eq!(config.templates.default_suffix, ".html.tera");
        assert_eq!(config.templates.namespaces["mixtape"].suffix(), Some(".tera"));
        assert_eq!(config.output.html, "output/html");
        assert_eq!(config.bundles["core/card"].depends_on, vec!["core/base".to_string()]);

        let definitions = config.component_definitions();
        let card = definitions.get("card").unwrap();
        assert_eq!(card.renamed("bodyText"), "content");
        assert_eq!(card.bundles, vec!["core/card".to_string()]);
    }

    #[test]
    fn test_template_catalog_keys() {
        let config = ProjectConfig::parse(PROJECT, "/project").unwrap();
        let catalog = config.template_catalog().unwrap();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["card", "hero", "page"]);
        assert_eq!(catalog.reference("hero"), Some(&TemplateRef::new("mixtape", "hero-banner")));
        assert_eq!(catalog.reference("page"), Some(&TemplateRef::new("common", "page")));
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let config = ProjectConfig::parse(PROJECT, "/project").unwrap();
        assert_eq!(config.html_dir().unwrap(), PathBuf::from("/project/output/html"));
        assert_eq!(config.resolve_path("/abs").unwrap(), PathBuf::from("/abs"));
    }

    #[test]
    fn test_undeclared_namespace_rejected() {
        let err = ProjectConfig::parse("[components.card]\nnamespace = \"nope\"\n", ".").unwrap_err();
        assert!(format!("{err:#}").contains("undeclared template namespace 'nope'"));
    }

    #[test]
    fn test_rename_of_undeclared_slot_rejected() {
        let content = r#"
[templates.namespaces]
common = "t"

[components.card]
namespace = "common"
renames = { title = "heading" }
"#;
        assert!(ProjectConfig::parse(content, ".").is_err());
    }

    #[test]
    fn test_slots_clashing_on_variables_rejected() {
        let reserved = r#"
[templates.namespaces]
common = "t"

[components.card]
namespace = "common"
slots = ["title", "theme"]
"#;
        let err = ProjectConfig::parse(reserved, ".").unwrap_err();
        assert!(
            format!("{err:#}").contains("component 'card': slot 'theme' maps onto reserved variable"),
            "{err:#}"
        );

        let collision = r#"
[templates.namespaces]
common = "t"

[components.card]
namespace = "common"
slots = ["bodyText", "body_text"]
"#;
        let err = ProjectConfig::parse(collision, ".").unwrap_err();
        assert!(format!("{err:#}").contains("both map onto variable 'body_text'"), "{err:#}");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(ProjectConfig::parse("[output]\nhtlm = \"x\"\n", ".").is_err());
    }

    #[test]
    fn test_load_and_locate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, PROJECT).unwrap();

        assert_eq!(ProjectConfig::locate(Some(&path)).unwrap(), path);
        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.root(), temp.path());
        assert_eq!(config.scenario_file(), temp.path().join(SCENARIO_FILE_NAME));

        assert!(ProjectConfig::locate(Some(&temp.path().join("missing.toml"))).is_err());
    }
}
