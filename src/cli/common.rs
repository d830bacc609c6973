//! Shared project loading for CLI commands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::config::ProjectConfig;
use crate::render::RenderBox;
use crate::scenario::{Scenario, filter_scenarios, load_scenarios};

/// Scenario selection flags shared by the batch commands.
#[derive(Args, Debug, Clone, Default)]
pub struct BatchArgs {
    /// Only process scenarios whose id contains this value
    #[arg(long)]
    pub filter: Option<String>,

    /// Scenario file (default: scenarios.yaml next to the project file)
    #[arg(long)]
    pub scenarios: Option<PathBuf>,

    /// Run without writing any files
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl BatchArgs {
    /// Load the project and the scenarios these flags select.
    pub fn load(&self, cli: &CliConfig) -> Result<ProjectContext> {
        ProjectContext::load(cli, self.scenarios.as_deref(), self.filter.as_deref())
    }
}

/// A loaded project: configuration, render box and selected scenarios.
#[derive(Debug)]
pub struct ProjectContext {
    pub config: ProjectConfig,
    pub render_box: RenderBox,
    pub scenarios: Vec<Scenario>,
}

impl ProjectContext {
    /// Load the project file and its scenarios.
    ///
    /// `scenarios` overrides the scenario file next to the project file;
    /// `filter` keeps scenarios whose id contains it.
    pub fn load(
        cli: &CliConfig,
        scenarios: Option<&Path>,
        filter: Option<&str>,
    ) -> Result<Self> {
        let path = ProjectConfig::locate(cli.config_path.as_deref())?;
        let config = ProjectConfig::load(&path)?;
        let render_box = config.render_box()?;

        let scenario_file = scenarios.map_or_else(|| config.scenario_file(), Path::to_path_buf);
        let all = load_scenarios(&scenario_file).with_context(|| {
            format!("Failed to load scenarios from {}", scenario_file.display())
        })?;
        let total = all.len();
        let scenarios = filter_scenarios(all, filter);
        tracing::info!("Selected {} of {total} scenario(s)", scenarios.len());

        Ok(Self {
            config,
            render_box,
            scenarios,
        })
    }
}
