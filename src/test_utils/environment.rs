//! A complete project on disk for CLI tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fixtures;
use crate::constants::{CONFIG_FILE_NAME, DEFAULT_TEMPLATE_SUFFIX, SCENARIO_FILE_NAME};

const PROJECT_TOML: &str = r#"
[templates.namespaces]
common = "templates/common"

[components.card]
namespace = "common"
slots = ["title", "body"]
bundles = ["core/card"]

[components.paragraph]
namespace = "common"
slots = ["text"]
bundles = ["core/text"]

[components.list]
namespace = "common"
slots = ["items"]

[components.broken]
namespace = "common"

[bundles."core/base"]
css = { "/css/base.css" = {} }
js = { "/js/base.js" = { attributes = { defer = true } } }

[bundles."core/card"]
depends_on = ["core/base"]
css = { "/css/card.css" = { attributes = { media = "all" } } }

[bundles."core/text"]
depends_on = ["core/base"]
css = { "/css/text.css" = {} }

[output]
html = "out/html"
snapshots = "out/snapshots"
assets_root = "assets"
page_template = "common/page"
"#;

const SCENARIOS_YAML: &str = r"
- id: card-basic
  component: card
  slots:
    title: Hello
    body:
      component: paragraph
      slots: { text: World }
- id: paragraph-only
  component: paragraph
  slots: { text: Alone }
";

/// A temporary project with the fixture library, assets and scenarios.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_dir: PathBuf,
}

impl TestProject {
    /// Write the fixture project.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let project = Self {
            temp_dir,
            project_dir,
        };

        project.write(CONFIG_FILE_NAME, PROJECT_TOML.trim_start())?;
        project.write(SCENARIO_FILE_NAME, SCENARIOS_YAML.trim_start())?;
        for (name, content) in fixtures::templates() {
            let path = format!("templates/{}/{name}{DEFAULT_TEMPLATE_SUFFIX}", fixtures::NAMESPACE);
            project.write(&path, content)?;
        }
        for asset in ["css/base.css", "css/card.css", "css/text.css", "js/base.js"] {
            project.write(&format!("assets/{asset}"), &format!("/* {asset} */\n"))?;
        }
        Ok(project)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_dir.join(relative)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path(CONFIG_FILE_NAME)
    }

    /// Write a file relative to the project, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Replace the scenario file.
    pub fn write_scenarios(&self, yaml: &str) -> Result<PathBuf> {
        self.write(SCENARIO_FILE_NAME, yaml)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }
}
