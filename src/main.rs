//! ids-render CLI entry point
//!
//! Parses arguments, installs logging, runs the command and prints
//! user-friendly errors:
//! - `render` - render scenarios to HTML pages with their assets
//! - `snapshot` - write structural YAML snapshots of scenarios

use anyhow::Result;
use clap::Parser;
use ids_render::cli;
use ids_render::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
