//! Test utilities for ids-render
//!
//! Helpers shared by unit and integration tests:
//! - [`init_test_logging`] wires `tracing` into the test harness
//! - [`fixtures`] builds an in-memory component library (definitions,
//!   templates and asset bundles) for exercising the engines directly
//! - [`TestProject`] writes the same library to a temporary directory as a
//!   complete project for CLI tests
//!
//! # Example
//!
//! ```rust,no_run
//! use ids_render::test_utils::{fixtures, init_test_logging};
//!
//! init_test_logging(None);
//! let render_box = fixtures::render_box().unwrap();
//! assert!(render_box.libraries().contains("core/card"));
//! ```

pub mod environment;
pub mod fixtures;

pub use environment::TestProject;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` if given, otherwise `RUST_LOG`; with neither, logging stays
/// off.
///
/// ```bash
/// RUST_LOG=ids_render=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
