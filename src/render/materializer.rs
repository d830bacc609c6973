//! Render tree materialisation.
//!
//! Walks a build structure post-order. Deferred nodes are expanded through
//! the [`BuildRegistry`] and spliced in place; children are materialised
//! before their parent so a themed node's template receives already
//! rendered markup for nested components; every attached bundle is recorded
//! in the [`BundleAccumulator`]; themed nodes become trusted [`Markup`].

use super::accumulator::BundleAccumulator;
use super::expand;
use crate::build::{BuildNode, BuildRegistry, Fields, MapNode, Markup, ThemedNode};
use crate::core::{RenderError, Result};
use crate::templating::TemplateCatalog;
use crate::templating::context::{TemplateContext, describe};

/// State for materialising one tree.
pub struct Materializer<'a> {
    registry: &'a BuildRegistry,
    catalog: &'a TemplateCatalog,
    accumulator: &'a mut BundleAccumulator,
    /// Identity of the top-level component, carried on render failures.
    component: &'a str,
}

impl<'a> Materializer<'a> {
    pub fn new(
        registry: &'a BuildRegistry,
        catalog: &'a TemplateCatalog,
        accumulator: &'a mut BundleAccumulator,
        component: &'a str,
    ) -> Self {
        Self {
            registry,
            catalog,
            accumulator,
            component,
        }
    }

    /// Materialise `node`, returning a tree with no themed or deferred nodes.
    pub fn materialize_node(&mut self, node: BuildNode) -> Result<BuildNode> {
        let node = match node {
            BuildNode::Deferred(deferred) => BuildNode::Themed(expand(deferred, self.registry)?),
            other => other,
        };

        match node {
            BuildNode::Scalar(_) | BuildNode::Markup(_) => Ok(node),
            BuildNode::List(items) => Ok(BuildNode::List(
                items.into_iter().map(|item| self.materialize_node(item)).collect::<Result<_>>()?,
            )),
            BuildNode::Map(MapNode { attached, fields }) => {
                let fields = self.materialize_fields(fields)?;
                self.accumulator.extend(&attached);
                Ok(BuildNode::Map(MapNode { attached, fields }))
            }
            BuildNode::Themed(themed) => self.render_themed(themed).map(BuildNode::Markup),
            BuildNode::Deferred(deferred) => Err(RenderError::invalid_structure(format!(
                "deferred node {} survived expansion",
                deferred.token
            ))),
        }
    }

    fn materialize_fields(&mut self, fields: Fields) -> Result<Fields> {
        fields
            .into_iter()
            .map(|(name, value)| Ok((name, self.materialize_node(value)?)))
            .collect()
    }

    fn render_themed(&mut self, themed: ThemedNode) -> Result<Markup> {
        let ThemedNode {
            template,
            attached,
            fields,
        } = themed;
        let fields = self.materialize_fields(fields)?;
        self.accumulator.extend(&attached);

        let context =
            TemplateContext::from_fields(&template, &attached, &fields, self.catalog.escapes())?;
        tracing::debug!("Rendering '{template}' with fields [{}]", describe(&fields));
        self.catalog.render(&template, &context, self.component)
    }
}

/// Materialise `node` into markup, recording touched bundles.
///
/// `component` is the top-level component identity used to label render
/// failures.
///
/// # Errors
///
/// Registry and catalog errors propagate unchanged; nothing is retried and
/// the whole tree is abandoned on the first failure.
pub fn materialize(
    node: BuildNode,
    registry: &BuildRegistry,
    catalog: &TemplateCatalog,
    accumulator: &mut BundleAccumulator,
    component: &str,
) -> Result<Markup> {
    let materialized =
        Materializer::new(registry, catalog, accumulator, component).materialize_node(node)?;
    reduce_to_markup(materialized, catalog.escapes())
}

/// Reduce a materialised tree to a single markup value.
///
/// Markup is kept and collections concatenate their children in order.
/// Scalars are escaped only when `escape` is set, matching how the catalog
/// treats scalars inside templates.
pub fn reduce_to_markup(node: BuildNode, escape: bool) -> Result<Markup> {
    match node {
        BuildNode::Markup(markup) => Ok(markup),
        BuildNode::Scalar(scalar) if escape => Ok(Markup::escape(&scalar.as_text())),
        BuildNode::Scalar(scalar) => Ok(Markup::trusted(scalar.as_text())),
        BuildNode::List(items) => concat(items, escape),
        BuildNode::Map(MapNode { fields, .. }) => concat(fields.into_values(), escape),
        BuildNode::Themed(themed) => Err(RenderError::invalid_structure(format!(
            "themed node '{}' was not rendered",
            themed.template
        ))),
        BuildNode::Deferred(deferred) => Err(RenderError::invalid_structure(format!(
            "deferred node {} was not expanded",
            deferred.token
        ))),
    }
}

fn concat(children: impl IntoIterator<Item = BuildNode>, escape: bool) -> Result<Markup> {
    let mut markup = Markup::default();
    for child in children {
        markup.push(&reduce_to_markup(child, escape)?);
    }
    Ok(markup)
}
