//! Rendering: materialisation, flattening and page assembly.
//!
//! [`RenderBox`] ties the pieces together for one process: component
//! definitions, the template catalog and the resolved asset libraries are
//! set up once, and every render pass gets a fresh [`BuildRegistry`]
//! generation and its own [`BundleAccumulator`].
//!
//! Both materialisers expand deferred nodes with [`expand`], so they agree on
//! the shape of the tree wherever both apply.

pub mod accumulator;
pub mod flatten;
pub mod materializer;

pub use accumulator::BundleAccumulator;
pub use flatten::flatten;
pub use materializer::{Materializer, materialize, reduce_to_markup};

use serde_json::Value;
use std::sync::Arc;

use crate::assets::{AssetGraph, BundleDeclarations, PageAssets, ResolvedLibraries};
use crate::build::{
    BuildNode, BuildRegistry, Component, ComponentDefinitions, DeferredNode, Markup, ThemedNode,
};
use crate::core::{RenderError, Result};
use crate::scenario::Scenario;
use crate::templating::{TemplateCatalog, TemplateContext};

/// Expand a deferred node and splice the expansion into its position.
///
/// The expansion's fields win over sibling fields at the same position.
pub fn expand(deferred: DeferredNode, registry: &BuildRegistry) -> Result<ThemedNode> {
    let token = deferred.token;
    let expansion = registry.resolve(token)?;
    tracing::debug!("Expanding deferred node {token} into '{}'", expansion.template);
    Ok(deferred.splice(expansion))
}

/// A component materialised to markup, with the assets it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedComponent {
    pub markup: Markup,
    /// Bundles touched anywhere in the tree, in first-touched order.
    pub bundles: BundleAccumulator,
    pub assets: PageAssets,
}

/// A full page: the component wrapped in the page template.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub html: String,
    pub component: RenderedComponent,
}

/// Everything needed to render components for one run.
#[derive(Debug)]
pub struct RenderBox {
    definitions: Arc<ComponentDefinitions>,
    catalog: TemplateCatalog,
    libraries: ResolvedLibraries,
    page_template: Option<String>,
}

impl RenderBox {
    pub fn new(
        definitions: ComponentDefinitions,
        catalog: TemplateCatalog,
        libraries: ResolvedLibraries,
    ) -> Self {
        Self {
            definitions: Arc::new(definitions),
            catalog,
            libraries,
            page_template: None,
        }
    }

    /// Resolve `bundles` through the asset graph and build the box.
    ///
    /// # Errors
    ///
    /// [`RenderError::DependencyDepthExceeded`] if any bundle's dependency
    /// closure is too deep or cyclic.
    pub fn from_declarations(
        definitions: ComponentDefinitions,
        catalog: TemplateCatalog,
        bundles: BundleDeclarations,
    ) -> Result<Self> {
        let libraries = AssetGraph::build(bundles).resolve()?;
        Ok(Self::new(definitions, catalog, libraries))
    }

    /// Template key used by [`render_page`](Self::render_page).
    #[must_use]
    pub fn with_page_template(mut self, key: impl Into<String>) -> Self {
        self.page_template = Some(key.into());
        self
    }

    pub fn definitions(&self) -> &ComponentDefinitions {
        &self.definitions
    }

    pub const fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub const fn libraries(&self) -> &ResolvedLibraries {
        &self.libraries
    }

    /// A registry sharing this box's component definitions.
    pub fn registry(&self) -> BuildRegistry {
        BuildRegistry::new(Arc::clone(&self.definitions))
    }

    /// Build and materialise `component` in a fresh registry.
    pub fn render(&self, component: &dyn Component) -> Result<RenderedComponent> {
        self.render_in(&mut self.registry(), component)
    }

    /// Build and materialise `component`, starting a new pass on `registry`.
    ///
    /// # Errors
    ///
    /// Fatal registry, catalog and structure errors, or the recoverable
    /// [`RenderError::TemplateRender`].
    pub fn render_in(
        &self,
        registry: &mut BuildRegistry,
        component: &dyn Component,
    ) -> Result<RenderedComponent> {
        registry.begin_pass();
        let root = registry.defer(component)?;

        let mut bundles = BundleAccumulator::new();
        let markup = materialize(root, registry, &self.catalog, &mut bundles, component.identity())?;
        let assets = self.libraries.collect(bundles.iter());
        tracing::debug!(
            "Rendered '{}': {} byte(s), {} bundle(s), {} css, {} js",
            component.identity(),
            markup.as_str().len(),
            bundles.len(),
            assets.css.len(),
            assets.js.len()
        );

        Ok(RenderedComponent {
            markup,
            bundles,
            assets,
        })
    }

    /// Render a scenario inside the page template.
    ///
    /// The page template receives `inner` (the component markup, trusted),
    /// `css` and `js` (lists of asset objects with `href`/`src` and
    /// `attributes`), `scenario` (the scenario id), `viewport_width` and
    /// `viewport_height`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Config`] if no page template is set, otherwise as
    /// [`render_in`](Self::render_in).
    pub fn render_page(
        &self,
        registry: &mut BuildRegistry,
        scenario: &Scenario,
    ) -> Result<RenderedPage> {
        let page_template = self.page_template.as_deref().ok_or_else(|| RenderError::Config {
            message: "no page template configured".to_string(),
        })?;
        let component = self.render_in(registry, scenario)?;

        let mut context = TemplateContext::new();
        context.insert("inner", Value::String(component.markup.as_str().to_string()));
        context.insert("css", component.assets.css.iter().map(|a| a.to_value()).collect());
        context.insert("js", component.assets.js.iter().map(|a| a.to_value()).collect());
        context.insert("scenario", Value::String(scenario.id.clone()));
        context.insert("viewport_width", scenario.viewport_width.into());
        context.insert("viewport_height", scenario.viewport_height.into());

        let html = self.catalog.render(page_template, &context, scenario.identity())?;
        Ok(RenderedPage {
            html: html.into_string(),
            component,
        })
    }

    /// Build `component` and flatten it for a structural snapshot.
    pub fn flatten(&self, component: &dyn Component) -> Result<BuildNode> {
        let mut registry = self.registry();
        let root = registry.defer(component)?;
        flatten(root, &registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetBundle, FileDefinition};
    use crate::build::{ComponentDefinition, DeclaredComponent};
    use crate::templating::{MemorySource, TemplateRef};

    fn render_box() -> RenderBox {
        let definitions: ComponentDefinitions = [ComponentDefinition::new("card")
            .with_slots(["title"])
            .with_bundles(["core/card"])]
        .into_iter()
        .collect();
        let source = MemorySource::new()
            .with_template(TemplateRef::new("t", "card"), "<b>{{ title }}</b>")
            .with_template(
                TemplateRef::new("t", "page"),
                "{{ scenario }}|{% for c in css %}{{ c.href }};{% endfor %}|{{ inner }}|{{ viewport_width }}",
            );
        let catalog = TemplateCatalog::new(source)
            .with_template("card", TemplateRef::new("t", "card"))
            .with_template("page", TemplateRef::new("t", "page"));

        let mut bundles = BundleDeclarations::new();
        bundles.insert("core/card".to_string(), AssetBundle::new().with_dependency("core/base"));
        bundles.insert(
            "core/base".to_string(),
            AssetBundle::new().with_css("/css/base.css", FileDefinition::new()),
        );

        RenderBox::from_declarations(definitions, catalog, bundles)
            .unwrap()
            .with_page_template("page")
    }

    fn card(title: &str) -> DeclaredComponent {
        serde_yaml::from_str(&format!("{{ component: card, slots: {{ title: '{title}' }} }}")).unwrap()
    }

    #[test]
    fn test_render_collects_transitive_assets() {
        let rendered = render_box().render(&card("Hi")).unwrap();
        assert_eq!(rendered.markup.as_str(), "<b>Hi</b>");
        assert_eq!(rendered.bundles.iter().collect::<Vec<_>>(), vec!["core/card"]);
        assert_eq!(rendered.assets.css[0].public_path, "css/1-base.css");
    }

    #[test]
    fn test_render_in_starts_new_pass() {
        let render_box = render_box();
        let mut registry = render_box.registry();
        let first = registry.generation();
        render_box.render_in(&mut registry, &card("One")).unwrap();
        let second = registry.generation();
        render_box.render_in(&mut registry, &card("Two")).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, registry.generation());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_render_page() {
        let scenario: Scenario = serde_yaml::from_str(
            "{ id: card-basic, component: card, slots: { title: '<x>' }, viewport_width: 640 }",
        )
        .unwrap();
        let render_box = render_box();
        let page = render_box.render_page(&mut render_box.registry(), &scenario).unwrap();
        assert_eq!(page.html, "card-basic|css/1-base.css;|<b>&lt;x&gt;</b>|640");
    }

    #[test]
    fn test_render_page_requires_page_template() {
        let render_box = RenderBox::new(
            ComponentDefinitions::new(),
            TemplateCatalog::new(MemorySource::new()),
            ResolvedLibraries::default(),
        );
        let scenario: Scenario = serde_yaml::from_str("{ id: a, component: card }").unwrap();
        let err = render_box.render_page(&mut render_box.registry(), &scenario).unwrap_err();
        assert!(matches!(err, RenderError::Config { .. }));
    }

    #[test]
    fn test_flatten_component() {
        let flat = render_box().flatten(&card("Hi")).unwrap();
        assert!(!flat.contains_deferred());
        assert!(matches!(flat, BuildNode::Themed(ref t) if t.template == "card"));
    }
}
