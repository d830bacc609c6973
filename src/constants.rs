//! Global constants used throughout the ids-render codebase.
//!
//! Limits, reserved field names and default file names that are shared
//! across modules live here so magic values stay discoverable.

/// Maximum recursion depth when computing the transitive closure of an
/// asset bundle's dependencies.
///
/// A dependency chain of exactly this many declared bundles resolves; one
/// more raises [`RenderError::DependencyDepthExceeded`]. Cycles always hit
/// the ceiling.
///
/// [`RenderError::DependencyDepthExceeded`]: crate::core::RenderError::DependencyDepthExceeded
pub const MAX_DEPENDENCY_DEPTH: usize = 32;

/// Marker prefixing directive (non-data) keys at the serialization boundary.
///
/// Inside the crate directives are modelled by [`FieldName::Directive`];
/// the marker only appears in JSON/YAML input and snapshot output.
///
/// [`FieldName::Directive`]: crate::build::FieldName::Directive
pub const DIRECTIVE_MARKER: char = '#';

/// Reserved key holding a themed node's template key.
pub const THEME_KEY: &str = "theme";

/// Reserved key holding the asset bundles attached to a node.
pub const ATTACHED_KEY: &str = "attached";

/// Reserved key nested under [`ATTACHED_KEY`] that lists bundle names.
pub const LIBRARY_KEY: &str = "library";

/// Reserved key naming a node's element type (only `deferred` is understood).
pub const TYPE_KEY: &str = "type";

/// Reserved key holding a deferred node's build token.
pub const TOKEN_KEY: &str = "token";

/// Element type value marking a deferred node.
pub const DEFERRED_TYPE: &str = "deferred";

/// Template variable names a slot may not map onto; the template context
/// uses them for the node's own directives.
pub const RESERVED_VARIABLES: [&str; 4] = [THEME_KEY, ATTACHED_KEY, TYPE_KEY, TOKEN_KEY];

/// Default project configuration file name.
pub const CONFIG_FILE_NAME: &str = "ids-render.toml";

/// Default scenario file name, relative to the configuration file.
pub const SCENARIO_FILE_NAME: &str = "scenarios.yaml";

/// Default suffix appended to template names when loading from disk.
pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".html.tera";

/// Maximum number of "did you mean" suggestions for unknown template keys.
pub const MAX_TEMPLATE_SUGGESTIONS: usize = 3;
