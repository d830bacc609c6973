//! Command-line interface for ids-render.
//!
//! Batch commands drive the library over a project's scenario file:
//!
//! - `render` - materialise every scenario into a standalone HTML page with
//!   its CSS and JS files copied beside it
//! - `snapshot` - flatten every scenario into a YAML structural snapshot
//! - `dump` - `snapshot` then `render` over the same selection
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - errors only
//! - `--config` / `-c` - path to `ids-render.toml` (default: current directory)
//! - `--no-progress` - disable the progress bar

mod common;
mod dump;
mod progress;
mod render;
mod snapshot;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::{BatchArgs, ProjectContext};

/// Runtime options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit project file, if given.
    pub config_path: Option<PathBuf>,
    /// Hide progress bars.
    pub no_progress: bool,
}

/// Render design-system components and their assets.
#[derive(Parser, Debug)]
#[command(name = "ids-render", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the project file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render scenarios to HTML pages with their assets
    Render(render::RenderCommand),

    /// Write structural YAML snapshots of scenarios
    Snapshot(snapshot::SnapshotCommand),

    /// Write snapshots, then render pages
    Dump(dump::DumpCommand),
}

impl Cli {
    /// Log filter for the verbosity flags.
    ///
    /// `RUST_LOG` applies only when neither flag is given.
    pub fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    fn build_config(&self) -> CliConfig {
        CliConfig {
            config_path: self.config.clone(),
            no_progress: self.no_progress || self.quiet,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Render(cmd) => cmd.execute(&config).await,
            Commands::Snapshot(cmd) => cmd.execute(&config).await,
            Commands::Dump(cmd) => cmd.execute(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_command() {
        let cli = Cli::try_parse_from([
            "ids-render",
            "render",
            "--filter",
            "card",
            "--dry-run",
            "--no-progress",
            "-c",
            "project/ids-render.toml",
        ])
        .unwrap();
        let config = cli.build_config();
        assert!(config.no_progress);
        assert_eq!(config.config_path, Some(PathBuf::from("project/ids-render.toml")));
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_parse_dump_command() {
        let cli =
            Cli::try_parse_from(["ids-render", "dump", "--filter", "card", "-n"]).unwrap();
        let Commands::Dump(dump) = cli.command else {
            panic!("expected dump command");
        };
        let rendered = format!("{dump:?}");
        assert!(rendered.contains("filter: Some(\"card\")"), "{rendered}");
        assert!(rendered.contains("dry_run: true"), "{rendered}");
    }

    #[test]
    fn test_quiet_hides_progress() {
        let cli = Cli::try_parse_from(["ids-render", "snapshot", "-q"]).unwrap();
        assert!(cli.build_config().no_progress);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ids-render", "render", "-v", "-q"]).is_err());
    }
}
