//! `snapshot` command: scenarios to structural YAML snapshots.
//!
//! Unlike `render`, any failure aborts the run, naming the scenario.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::BatchArgs;
use super::progress::batch_progress;
use crate::snapshot::{snapshot_path, to_yaml};

#[derive(Args, Debug)]
pub struct SnapshotCommand {
    /// Scenario selection and dry-run flags
    #[command(flatten)]
    batch: BatchArgs,
}

impl SnapshotCommand {
    pub fn new(batch: BatchArgs) -> Self {
        Self { batch }
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let project = self.batch.load(cli)?;
        let snapshot_dir = project.config.snapshot_dir()?;

        if self.batch.dry_run {
            println!("{}", "This is a dry run; nothing will be written.".yellow());
        }

        let bar = batch_progress(project.scenarios.len(), "Snapshots", cli.no_progress);
        for scenario in &project.scenarios {
            bar.set_message(scenario.id.clone());
            let flat = project
                .render_box
                .flatten(scenario)
                .with_context(|| format!("Failed to render scenario '{}'", scenario.id))?;
            let yaml = to_yaml(&flat)
                .with_context(|| format!("Failed to serialize scenario '{}'", scenario.id))?;

            let path = snapshot_path(&snapshot_dir, &scenario.id);
            if !self.batch.dry_run {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                tokio::fs::write(&path, yaml)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            bar.println(format!("Writing {} to {}", scenario.id, path.display()));
            bar.inc(1);
        }
        bar.finish_and_clear();

        println!("{} Wrote {} snapshot(s)", "✓".green(), project.scenarios.len());
        Ok(())
    }
}
