//! `render` command: scenarios to standalone HTML pages.
//!
//! Each scenario is rendered inside the page template and written to
//! `<html>/<id>/index.html`; the CSS and JS files the page needs are copied
//! to `<html>/<id>/css/` and `<html>/<id>/js/`. A scenario that fails to
//! render or to be written is reported and skipped, and the command fails at
//! the end if any did.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::CliConfig;
use super::common::BatchArgs;
use super::progress::batch_progress;
use crate::render::RenderedPage;

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Scenario selection and dry-run flags
    #[command(flatten)]
    batch: BatchArgs,
}

impl RenderCommand {
    pub fn new(batch: BatchArgs) -> Self {
        Self { batch }
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let project = self.batch.load(cli)?;
        let html_dir = project.config.html_dir()?;
        let assets_root = project.config.assets_root()?;

        if self.batch.dry_run {
            println!("{}", "This is a dry run; nothing will be written.".yellow());
        }

        let bar = batch_progress(project.scenarios.len(), "Rendering", cli.no_progress);
        let mut registry = project.render_box.registry();
        let mut rendered = 0usize;
        let mut failed: Vec<(String, anyhow::Error)> = Vec::new();

        for scenario in &project.scenarios {
            bar.set_message(scenario.id.clone());
            tracing::info!("Rendering scenario '{}'", scenario.id);

            match project.render_box.render_page(&mut registry, scenario) {
                Ok(_) if self.batch.dry_run => rendered += 1,
                Ok(page) => {
                    let out_dir = html_dir.join(&scenario.id);
                    match write_page(&page, &out_dir, &assets_root).await {
                        Ok(()) => {
                            tracing::info!("Wrote {}", out_dir.display());
                            rendered += 1;
                        }
                        Err(e) => {
                            tracing::error!("Scenario '{}' could not be written: {e:#}", scenario.id);
                            failed.push((scenario.id.clone(), e));
                        }
                    }
                }
                Err(e) => {
                    if e.is_recoverable() {
                        tracing::warn!("Scenario '{}' failed to render: {e}", scenario.id);
                    } else {
                        tracing::error!("Scenario '{}' aborted: {e}", scenario.id);
                    }
                    failed.push((scenario.id.clone(), anyhow::Error::from(e)));
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        println!("{} Rendered {rendered} scenario(s)", "✓".green());
        if failed.is_empty() {
            return Ok(());
        }
        for (id, error) in &failed {
            eprintln!("{} {id}: {error:#}", "✗".red());
        }
        bail!("{} of {} scenario(s) failed to render", failed.len(), project.scenarios.len())
    }
}

/// Write the page HTML and copy its assets under `out_dir`.
async fn write_page(page: &RenderedPage, out_dir: &Path, assets_root: &Path) -> Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let index = out_dir.join("index.html");
    tokio::fs::write(&index, &page.html)
        .await
        .with_context(|| format!("Failed to write {}", index.display()))?;

    for asset in page.component.assets.iter() {
        let source = assets_root.join(asset.source.trim_start_matches('/'));
        let target = out_dir.join(&asset.public_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::copy(&source, &target).await.with_context(|| {
            format!("Failed to copy asset {} to {}", source.display(), target.display())
        })?;
    }
    Ok(())
}
