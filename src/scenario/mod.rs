//! Scenario files: the components to render and how to present them.
//!
//! A scenario file is a YAML list. Each entry names a component, its slot
//! values (nested components allowed) and optional viewport hints:
//!
//! ```yaml
//! - id: card-basic
//!   component: card
//!   slots:
//!     title: Hello
//!     body:
//!       component: paragraph
//!       slots: { text: World }
//!   viewport_width: 800
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::build::component::build_slots;
use crate::build::{BuildRegistry, Component, SlotValue, Slots};
use crate::core::{RenderError, Result};

/// Ids name output directories and files, so they stay path-safe.
static SCENARIO_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").ok());

fn is_valid_id(id: &str) -> bool {
    SCENARIO_ID.as_ref().is_some_and(|re| re.is_match(id))
}

/// One component rendering to produce.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Unique id; names the output directory and snapshot file.
    pub id: String,
    /// Root component identity.
    pub component: String,
    #[serde(default)]
    pub slots: IndexMap<String, SlotValue>,
    #[serde(default)]
    pub viewport_width: Option<u32>,
    #[serde(default)]
    pub viewport_height: Option<u32>,
}

impl Component for Scenario {
    fn identity(&self) -> &str {
        &self.component
    }

    fn build(&self, registry: &mut BuildRegistry) -> Result<Slots> {
        build_slots(&self.slots, registry)
    }
}

/// Parse scenarios from YAML text.
///
/// # Errors
///
/// YAML errors, and [`RenderError::Config`] for invalid or duplicate ids.
pub fn parse_scenarios(content: &str) -> Result<Vec<Scenario>> {
    let scenarios: Vec<Scenario> = serde_yaml::from_str(content)?;
    let mut seen = HashSet::new();
    for scenario in &scenarios {
        if !is_valid_id(&scenario.id) {
            return Err(RenderError::Config {
                message: format!(
                    "scenario id '{}' for component '{}' must be letters, digits, '.', '_' or '-'",
                    scenario.id, scenario.component
                ),
            });
        }
        if !seen.insert(scenario.id.as_str()) {
            return Err(RenderError::Config {
                message: format!("duplicate scenario id '{}'", scenario.id),
            });
        }
    }
    Ok(scenarios)
}

/// Load scenarios from a YAML file.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let content = std::fs::read_to_string(path)?;
    let scenarios = parse_scenarios(&content)?;
    tracing::debug!("Loaded {} scenario(s) from {}", scenarios.len(), path.display());
    Ok(scenarios)
}

/// Keep scenarios whose id contains `filter`; no filter keeps all.
pub fn filter_scenarios(scenarios: Vec<Scenario>, filter: Option<&str>) -> Vec<Scenario> {
    match filter {
        Some(needle) => scenarios.into_iter().filter(|s| s.id.contains(needle)).collect(),
        None => scenarios,
    }
}
