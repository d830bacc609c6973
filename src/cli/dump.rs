//! `dump` command: snapshots followed by HTML pages in one run.
//!
//! Both stages see the same scenario selection. Snapshots are written
//! first; a snapshot failure stops the run before any page is rendered.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::BatchArgs;
use super::render::RenderCommand;
use super::snapshot::SnapshotCommand;

#[derive(Args, Debug)]
pub struct DumpCommand {
    /// Scenario selection and dry-run flags
    #[command(flatten)]
    batch: BatchArgs,
}

impl DumpCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        tracing::info!("Dumping snapshots");
        SnapshotCommand::new(self.batch.clone()).execute(cli).await?;
        println!("{} Snapshots complete", "✓".green());

        tracing::info!("Dumping HTML pages");
        RenderCommand::new(self.batch).execute(cli).await?;
        println!("{} HTML complete", "✓".green());
        Ok(())
    }
}
