//! ids-render - render-tree resolution and asset resolution for design systems
//!
//! Components are declared once and rendered many times. Building a
//! component produces a build structure that may contain themed nodes (a
//! template key plus variables) and deferred nodes (a token pointing at a
//! nested component's build). Rendering expands the deferred nodes, turns
//! themed nodes into markup bottom-up through a template catalog, and
//! records which asset bundles were touched so the page gets exactly the
//! CSS and JS it needs.
//!
//! # Architecture Overview
//!
//! ```text
//! Component ──build──> BuildNode tree ──materialize──> Markup
//!                          │    ▲                         │
//!               defer      │    │ resolve                 │ touched bundles
//!                          ▼    │                         ▼
//!                      BuildRegistry               AssetGraph / ResolvedLibraries
//!                                                         │
//!                                                         ▼
//!                                                  PageAssets (css, js)
//! ```
//!
//! # Core Modules
//!
//! - [`build`] - build structures, the generational build registry and components
//! - [`templating`] - template sources, the lazy template catalog and contexts
//! - [`assets`] - bundle declarations, the dependency graph and resolved file sets
//! - [`render`] - materialisation, flattening and page assembly ([`render::RenderBox`])
//!
//! # Supporting Modules
//!
//! - [`core`] - error types and user-facing error display
//! - [`config`] - project configuration (`ids-render.toml`)
//! - [`scenario`] - scenario files listing what to render
//! - [`snapshot`] - YAML structural snapshots
//! - [`cli`] - the `render`, `snapshot` and `dump` commands
//! - [`constants`] - limits, reserved keys and default file names
//!
//! # Example
//!
//! ```rust,no_run
//! use ids_render::assets::BundleDeclarations;
//! use ids_render::build::{ComponentDefinition, ComponentDefinitions, DeclaredComponent};
//! use ids_render::render::RenderBox;
//! use ids_render::templating::{MemorySource, TemplateCatalog, TemplateRef};
//!
//! # fn main() -> anyhow::Result<()> {
//! let definitions: ComponentDefinitions =
//!     [ComponentDefinition::new("card").with_slots(["title"])].into_iter().collect();
//! let catalog = TemplateCatalog::new(
//!     MemorySource::new().with_template(TemplateRef::new("common", "card"), "<b>{{ title }}</b>"),
//! )
//! .with_template("card", TemplateRef::new("common", "card"));
//!
//! let render_box = RenderBox::from_declarations(definitions, catalog, BundleDeclarations::new())?;
//! let card: DeclaredComponent = serde_yaml::from_str("{ component: card, slots: { title: Hi } }")?;
//! assert_eq!(render_box.render(&card)?.markup.as_str(), "<b>Hi</b>");
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod build;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod render;
pub mod scenario;
pub mod snapshot;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
