//! Templating: template sources, the template catalog and render contexts.
//!
//! Templates are Tera templates addressed by a key (normally a component
//! identity). The [`TemplateCatalog`] maps keys to [`TemplateRef`]s, loads
//! them through a [`TemplateSource`] on first use and memoizes the compiled
//! result. A [`TemplateContext`] is built from a themed node's fields.
//!
//! # Example
//!
//! ```rust,no_run
//! use ids_render::templating::{MemorySource, TemplateCatalog, TemplateContext, TemplateRef};
//!
//! let source = MemorySource::new()
//!     .with_template(TemplateRef::new("common", "card"), "<div>{{ title }}</div>");
//! let catalog = TemplateCatalog::new(source).with_template("card", TemplateRef::new("common", "card"));
//!
//! let mut context = TemplateContext::new();
//! context.insert("title", serde_json::json!("Hello"));
//! let markup = catalog.render("card", &context, "card")?;
//! assert_eq!(markup.as_str(), "<div>Hello</div>");
//! # Ok::<(), ids_render::core::RenderError>(())
//! ```

pub mod catalog;
pub mod context;
pub mod source;

pub use catalog::{CatalogStats, Template, TemplateCatalog, format_tera_error};
pub use context::TemplateContext;
pub use source::{DirectorySource, MemorySource, NamespaceDir, TemplateRef, TemplateSource};
