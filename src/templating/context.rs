//! Template context construction.
//!
//! A themed node's fields become the template context. Markup values are
//! inserted verbatim; plain strings are HTML-escaped here when escaping is
//! enabled. Tera's own autoescaping is switched off in the catalog, so markup
//! rendered by a nested template is never escaped twice.

use serde_json::{Map, Value};
use tera::Context as TeraContext;

use crate::build::{BuildNode, FieldName, Fields, MapNode, Scalar};
use crate::constants::{ATTACHED_KEY, LIBRARY_KEY, THEME_KEY};
use crate::core::{RenderError, Result};

/// Variables passed to one template render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    variables: Map<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for a themed node.
    ///
    /// Plain fields go in first, directive fields (marker stripped) override
    /// plain fields of the same name, and the reserved `theme` / `attached`
    /// bookkeeping variables override both.
    pub fn from_fields(
        template: &str,
        attached: &[String],
        fields: &Fields,
        escape: bool,
    ) -> Result<Self> {
        let mut context = Self::new();
        for directive in [false, true] {
            for (name, value) in fields.iter().filter(|(n, _)| n.is_directive() == directive) {
                context.insert(name.name(), to_context_value(value, escape)?);
            }
        }
        context.insert(THEME_KEY, Value::String(template.to_string()));
        context.insert(ATTACHED_KEY, attached_value(attached));
        Ok(context)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub(crate) fn to_tera(&self) -> TeraContext {
        let mut context = TeraContext::new();
        for (name, value) in &self.variables {
            context.insert(name.as_str(), value);
        }
        context
    }
}

fn attached_value(attached: &[String]) -> Value {
    let mut object = Map::new();
    object.insert(
        LIBRARY_KEY.to_string(),
        Value::Array(attached.iter().cloned().map(Value::String).collect()),
    );
    Value::Object(object)
}

/// Convert an already-materialised node into a context value.
///
/// Themed and deferred nodes must have been reduced to markup before their
/// parent renders; meeting one here is a structural error.
fn to_context_value(node: &BuildNode, escape: bool) -> Result<Value> {
    Ok(match node {
        BuildNode::Markup(markup) => Value::String(markup.as_str().to_string()),
        BuildNode::Scalar(Scalar::String(s)) if escape => Value::String(tera::escape_html(s)),
        BuildNode::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        BuildNode::Scalar(Scalar::Null) => Value::Null,
        BuildNode::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
        BuildNode::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
        BuildNode::List(items) => Value::Array(
            items.iter().map(|item| to_context_value(item, escape)).collect::<Result<_>>()?,
        ),
        BuildNode::Map(MapNode { fields, .. }) => {
            let mut object = Map::new();
            for directive in [false, true] {
                for (name, value) in fields.iter().filter(|(n, _)| n.is_directive() == directive)
                {
                    object.insert(name.name().to_string(), to_context_value(value, escape)?);
                }
            }
            Value::Object(object)
        }
        BuildNode::Themed(themed) => {
            return Err(RenderError::invalid_structure(format!(
                "themed node '{}' was not rendered before its parent",
                themed.template
            )));
        }
        BuildNode::Deferred(deferred) => {
            return Err(RenderError::invalid_structure(format!(
                "deferred node {} was not expanded before its parent",
                deferred.token
            )));
        }
    })
}

/// Field keys as they appear at the boundary, for debug output.
pub(crate) fn describe(fields: &Fields) -> String {
    fields.keys().map(FieldName::to_key).collect::<Vec<_>>().join(", ")
}
