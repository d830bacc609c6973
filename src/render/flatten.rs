//! Structural flattening for snapshots.
//!
//! Expands every deferred node with the same splice rule the materializer
//! uses, but renders nothing and collects no assets. Themed nodes stay
//! themed so the snapshot shows template keys, attachments and variables.

use super::expand;
use crate::build::{BuildNode, BuildRegistry, Fields, MapNode, ThemedNode};
use crate::core::Result;

/// Expand all deferred nodes in `node`.
///
/// A tree without deferred nodes is returned unchanged, so flattening is
/// idempotent on its own output.
pub fn flatten(node: BuildNode, registry: &BuildRegistry) -> Result<BuildNode> {
    Ok(match node {
        BuildNode::Deferred(deferred) => {
            let themed = expand(deferred, registry)?;
            BuildNode::Themed(flatten_themed(themed, registry)?)
        }
        BuildNode::Themed(themed) => BuildNode::Themed(flatten_themed(themed, registry)?),
        BuildNode::Map(MapNode { attached, fields }) => BuildNode::Map(MapNode {
            attached,
            fields: flatten_fields(fields, registry)?,
        }),
        BuildNode::List(items) => BuildNode::List(
            items.into_iter().map(|item| flatten(item, registry)).collect::<Result<_>>()?,
        ),
        leaf @ (BuildNode::Scalar(_) | BuildNode::Markup(_)) => leaf,
    })
}

fn flatten_themed(themed: ThemedNode, registry: &BuildRegistry) -> Result<ThemedNode> {
    Ok(ThemedNode {
        fields: flatten_fields(themed.fields, registry)?,
        ..themed
    })
}

fn flatten_fields(fields: Fields, registry: &BuildRegistry) -> Result<Fields> {
    fields
        .into_iter()
        .map(|(name, value)| Ok((name, flatten(value, registry)?)))
        .collect()
}
