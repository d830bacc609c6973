//! Core types shared across ids-render.
//!
//! Currently this is the error taxonomy: [`RenderError`] for every failure the
//! rendering and resolution engines can produce, and [`ErrorContext`] /
//! [`user_friendly_error`] for presenting them on the command line.

pub mod error;

pub use error::{ErrorContext, RenderError, user_friendly_error};

/// Result alias used by the rendering and resolution engines.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
