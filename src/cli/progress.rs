//! Batch progress bar.

use indicatif::{ProgressBar, ProgressStyle};

fn default_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("━╸━"))
}

/// A bar over `len` scenarios, or a hidden one when progress is disabled.
pub fn batch_progress(len: usize, prefix: &'static str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(default_style());
    bar.set_prefix(prefix);
    bar
}
