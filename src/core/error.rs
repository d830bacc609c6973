//! Error handling for ids-render
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`RenderError`]) so callers can tell fatal programming
//!    errors apart from recoverable render failures
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Fatal** (abort the whole pass): [`RenderError::UnknownToken`],
//!   [`RenderError::StaleToken`], [`RenderError::MissingDefinition`],
//!   [`RenderError::UnsupportedResource`], [`RenderError::UnknownTemplate`],
//!   [`RenderError::TemplateLoad`], [`RenderError::DependencyDepthExceeded`],
//!   [`RenderError::RegistryExhausted`], [`RenderError::InvalidStructure`]
//! - **Recoverable** (abandon the current item, continue the batch):
//!   [`RenderError::TemplateRender`]
//! - **Outer layers**: [`RenderError::Config`], [`RenderError::Io`],
//!   [`RenderError::Yaml`], [`RenderError::Toml`]
//!
//! Declaration gaps (a bundle name with no declaration) are not errors at all.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ids_render::core::{RenderError, user_friendly_error};
//!
//! let error = RenderError::DependencyDepthExceeded {
//!     bundle: "core/a".to_string(),
//!     deepest: "core/a".to_string(),
//!     limit: 32,
//! };
//! assert!(!error.is_recoverable());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::build::BuildToken;

/// The main error type for ids-render operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A build token has no registered build data.
    ///
    /// Missing registrations are programming errors: a deferred node was
    /// produced without going through [`BuildRegistry::register`].
    ///
    /// [`BuildRegistry::register`]: crate::build::BuildRegistry::register
    #[error("Cannot find build data for token {token}")]
    UnknownToken {
        /// The token that failed to resolve
        token: BuildToken,
    },

    /// A build token was minted by another registry or an earlier rendering pass.
    #[error("Build token {token} does not belong to registry generation {generation}")]
    StaleToken {
        /// The stale token
        token: BuildToken,
        /// Generation of the registry asked to resolve it
        generation: u32,
    },

    /// No component definition (template key, slots) exists for a resource.
    #[error("Missing component definition for '{resource}'")]
    MissingDefinition {
        /// Component identity that has no definition
        resource: String,
    },

    /// A resource exists but cannot be rendered in its current shape.
    #[error("Unsupported resource '{resource}': {reason}")]
    UnsupportedResource {
        /// Component identity
        resource: String,
        /// Why the resource is unsupported
        reason: String,
    },

    /// A template key is not known to the template catalog.
    #[error("Unknown template '{key}'")]
    UnknownTemplate {
        /// The requested template key
        key: String,
        /// Known keys that look similar
        suggestions: Vec<String>,
    },

    /// A template could not be loaded or compiled.
    #[error("Failed to load template '{key}': {reason}")]
    TemplateLoad {
        /// The template key being loaded
        key: String,
        /// Loader or compiler message
        reason: String,
    },

    /// A template failed while rendering.
    ///
    /// Recoverable: batch callers abandon the current item and continue.
    #[error("Unable to render {component} template '{template}': {message}")]
    TemplateRender {
        /// Identity of the top-level component being materialised
        component: String,
        /// Template key that failed
        template: String,
        /// Cleaned message chain from the template engine
        message: String,
    },

    /// Transitive dependency resolution exceeded the recursion ceiling.
    #[error("Recursion needs to be solved for {bundle}: depth limit {limit} exceeded at {deepest}")]
    DependencyDepthExceeded {
        /// Bundle whose closure was being computed
        bundle: String,
        /// Bundle reached when the ceiling was hit
        deepest: String,
        /// The ceiling
        limit: usize,
    },

    /// A rendering pass registered more builds than a token can index.
    #[error("Build registry generation {generation} is full ({registered} builds registered)")]
    RegistryExhausted {
        /// Generation of the full registry
        generation: u32,
        /// Builds already registered in the pass
        registered: usize,
    },

    /// A build structure is malformed.
    #[error("Invalid build structure: {reason}")]
    InvalidStructure {
        /// What is wrong with the structure
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RenderError {
    /// Whether a batch caller may skip the current item and continue.
    ///
    /// Only template render failures are recoverable; everything else is a
    /// programming or configuration error that aborts the pass.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::TemplateRender { .. })
    }

    /// Wrap a template engine failure with the owning component's identity.
    pub fn template_render(
        component: impl Into<String>,
        template: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TemplateRender {
            component: component.into(),
            template: template.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`RenderError::InvalidStructure`].
    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self::InvalidStructure {
            reason: reason.into(),
        }
    }
}

/// Error wrapper with a suggestion and details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: anyhow::Error) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message (with its cause chain): red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where the
/// failure mode is recognised.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let Some(render_error) = error.chain().find_map(|e| e.downcast_ref::<RenderError>()) else {
        return ErrorContext::new(error);
    };

    let (details, suggestion): (Option<&str>, Option<String>) = match render_error {
        RenderError::UnknownToken { .. } | RenderError::StaleToken { .. } => (
            Some("Build tokens are only valid for the registry and pass that minted them"),
            Some(
                "Build nested components through the same BuildRegistry that materialises them"
                    .to_string(),
            ),
        ),
        RenderError::MissingDefinition { resource } => {
            (None, Some(format!("Add a [components.{resource}] table to the configuration")))
        }
        RenderError::UnknownTemplate { suggestions, .. } => (
            Some("Template keys come from the [components] tables and the page template setting"),
            (!suggestions.is_empty())
                .then(|| format!("Did you mean: {}", suggestions.join(", "))),
        ),
        RenderError::TemplateLoad { .. } => (
            None,
            Some("Check the template namespace path and suffix in the configuration".to_string()),
        ),
        RenderError::TemplateRender { .. } => (
            Some(
                "Errors mentioning iteration or non-renderable values usually mean a collection was passed where markup was expected",
            ),
            Some("Check the slot values passed to the component".to_string()),
        ),
        RenderError::DependencyDepthExceeded { .. } => (
            Some("Asset bundle dependencies are probably cyclic"),
            Some("Remove the dependency that creates the cycle from depends_on".to_string()),
        ),
        RenderError::Config { .. } | RenderError::Toml(_) => {
            (None, Some("Check ids-render.toml for typos".to_string()))
        }
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    ctx.details = details.map(str::to_string);
    ctx.suggestion = suggestion;
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_template_render_is_recoverable() {
        assert!(RenderError::template_render("Card", "card", "boom").is_recoverable());
        assert!(
            !RenderError::MissingDefinition {
                resource: "card".to_string()
            }
            .is_recoverable()
        );
        assert!(!RenderError::invalid_structure("bad").is_recoverable());
    }

    #[test]
    fn test_template_render_message_names_component() {
        let error = RenderError::template_render("Card", "card", "Variable `x` not found");
        let message = error.to_string();
        assert!(message.contains("Card"));
        assert!(message.contains("card"));
        assert!(message.contains("Variable `x` not found"));
    }

    #[test]
    fn test_user_friendly_unknown_template_lists_suggestions() {
        let error = RenderError::UnknownTemplate {
            key: "crad".to_string(),
            suggestions: vec!["card".to_string()],
        };
        let ctx = user_friendly_error(anyhow::Error::from(error));
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: card"));
    }

    #[test]
    fn test_user_friendly_finds_error_through_context() {
        let error = anyhow::Error::from(RenderError::DependencyDepthExceeded {
            bundle: "a".to_string(),
            deepest: "b".to_string(),
            limit: 32,
        })
        .context("Failed to resolve assets");
        let ctx = user_friendly_error(error);
        assert!(ctx.details.as_ref().unwrap().contains("cyclic"));
        assert!(ctx.to_string().contains("Failed to resolve assets"));
    }
}
