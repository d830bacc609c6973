//! Build structure nodes.
//!
//! A component build produces a tree of [`BuildNode`]s. The tree is a tagged
//! variant rather than a generic map: scalars, lists and keyed maps are plain
//! data, [`ThemedNode`]s carry a template key and must become markup, and
//! [`DeferredNode`]s point at another component's build through a
//! [`BuildToken`] and must be expanded before anything else happens to them.
//!
//! Directive (bookkeeping) fields are told apart from data fields by
//! [`FieldName`], not by a key prefix. The `#` marker only exists at the JSON
//! boundary ([`BuildNode::from_json`] / [`BuildNode::to_json`]), where the
//! reserved keys `#theme`, `#attached`, `#type: deferred` and `#token` are
//! lifted into the typed node fields.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

use super::registry::BuildToken;
use crate::constants::{
    ATTACHED_KEY, DEFERRED_TYPE, DIRECTIVE_MARKER, LIBRARY_KEY, THEME_KEY, TOKEN_KEY, TYPE_KEY,
};
use crate::core::{RenderError, Result};

/// Name of a keyed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// A directive field (`#name` at the boundary), e.g. a resolved slot.
    Directive(String),
    /// A plain data field.
    Plain(String),
}

impl FieldName {
    /// Create a directive field name.
    pub fn directive(name: impl Into<String>) -> Self {
        Self::Directive(name.into())
    }

    /// Create a plain field name.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Parse a boundary key, stripping the directive marker if present.
    pub fn from_key(key: &str) -> Self {
        match key.strip_prefix(DIRECTIVE_MARKER) {
            Some(name) => Self::Directive(name.to_string()),
            None => Self::Plain(key.to_string()),
        }
    }

    /// The variable name with any marker removed.
    pub fn name(&self) -> &str {
        match self {
            Self::Directive(name) | Self::Plain(name) => name,
        }
    }

    /// Whether this is a directive field.
    pub const fn is_directive(&self) -> bool {
        matches!(self, Self::Directive(_))
    }

    /// The boundary key, with the marker for directives.
    pub fn to_key(&self) -> String {
        match self {
            Self::Directive(name) => format!("{DIRECTIVE_MARKER}{name}"),
            Self::Plain(name) => name.clone(),
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// Ordered keyed children. Order is the build order and is preserved.
pub type Fields = IndexMap<FieldName, BuildNode>;

/// Terminal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }

    /// Plain-text form used when a scalar has to be turned into markup.
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }
}

/// Rendered markup that is already escaped and must not be escaped again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    /// Trust `html` as already-escaped markup.
    pub fn trusted(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escape plain text into markup.
    pub fn escape(text: &str) -> Self {
        Self(tera::escape_html(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn push(&mut self, other: &Markup) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A keyed collection that is not themed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapNode {
    /// Asset bundles attached to this node.
    pub attached: Vec<String>,
    pub fields: Fields,
}

/// A node that resolves to markup through a template.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemedNode {
    /// Template key.
    pub template: String,
    /// Asset bundles attached to this node.
    pub attached: Vec<String>,
    /// Template variables, directive and plain.
    pub fields: Fields,
}

impl ThemedNode {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            attached: Vec::new(),
            fields: Fields::new(),
        }
    }

    /// Builder-style: attach an asset bundle.
    #[must_use]
    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.attached.push(bundle.into());
        self
    }

    /// Builder-style: set a field.
    #[must_use]
    pub fn with_field(mut self, name: FieldName, value: impl Into<BuildNode>) -> Self {
        self.fields.insert(name, value.into());
        self
    }
}

/// A placeholder for another component's build.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredNode {
    pub token: BuildToken,
    /// Bundles attached next to the placeholder; replaced by the expansion's.
    pub attached: Vec<String>,
    /// Sibling fields present at the placeholder's position.
    pub fields: Fields,
}

impl DeferredNode {
    pub fn new(token: BuildToken) -> Self {
        Self {
            token,
            attached: Vec::new(),
            fields: Fields::new(),
        }
    }

    /// Splice an expansion into this position.
    ///
    /// The expansion's fields take precedence over sibling fields already
    /// present here; siblings the expansion does not define are kept after
    /// the expansion's own fields. Attachments come from the expansion.
    pub fn splice(self, expansion: ThemedNode) -> ThemedNode {
        let ThemedNode {
            template,
            attached,
            mut fields,
        } = expansion;
        for (name, value) in self.fields {
            fields.entry(name).or_insert(value);
        }
        ThemedNode {
            template,
            attached,
            fields,
        }
    }
}

/// A node of a build structure.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildNode {
    Scalar(Scalar),
    List(Vec<BuildNode>),
    Map(MapNode),
    Themed(ThemedNode),
    Deferred(DeferredNode),
    Markup(Markup),
}

impl BuildNode {
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    pub fn deferred(token: BuildToken) -> Self {
        Self::Deferred(DeferredNode::new(token))
    }

    /// Build a plain map from `(name, value)` pairs.
    pub fn map<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, BuildNode)>,
        K: Into<FieldName>,
    {
        Self::Map(MapNode {
            attached: Vec::new(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Whether any deferred node remains in this tree.
    pub fn contains_deferred(&self) -> bool {
        match self {
            Self::Deferred(_) => true,
            Self::List(items) => items.iter().any(Self::contains_deferred),
            Self::Map(MapNode { fields, .. }) | Self::Themed(ThemedNode { fields, .. }) => {
                fields.values().any(Self::contains_deferred)
            }
            Self::Scalar(_) | Self::Markup(_) => false,
        }
    }

    /// Convert a boundary JSON value into a build structure.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidStructure`] when reserved keys carry the
    /// wrong kind of value or a `#token` appears outside a deferred node.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect::<Result<_>>()?)
            }
            Value::Object(object) => Self::from_object(object)?,
        })
    }

    fn from_object(object: Map<String, Value>) -> Result<Self> {
        let mut theme = None;
        let mut token = None;
        let mut deferred = false;
        let mut attached = Vec::new();
        let mut fields = Fields::new();

        for (key, value) in object {
            let name = FieldName::from_key(&key);
            match &name {
                FieldName::Directive(n) if n == THEME_KEY => {
                    match value {
                        Value::String(template) => theme = Some(template),
                        other => {
                            return Err(RenderError::invalid_structure(format!(
                                "#{THEME_KEY} must be a string, found {other}"
                            )));
                        }
                    }
                }
                FieldName::Directive(n) if n == ATTACHED_KEY => {
                    attached = parse_attached(value)?;
                }
                FieldName::Directive(n) if n == TOKEN_KEY => {
                    let Value::String(raw) = &value else {
                        return Err(RenderError::invalid_structure(format!(
                            "#{TOKEN_KEY} must be a string, found {value}"
                        )));
                    };
                    token = Some(raw.parse::<BuildToken>()?);
                }
                FieldName::Directive(n)
                    if n == TYPE_KEY && value.as_str() == Some(DEFERRED_TYPE) =>
                {
                    deferred = true;
                }
                _ => {
                    fields.insert(name, Self::from_json(value)?);
                }
            }
        }

        match (deferred, token) {
            (true, Some(token)) => Ok(Self::Deferred(DeferredNode {
                token,
                attached,
                fields,
            })),
            (true, None) => Err(RenderError::invalid_structure(format!(
                "deferred node without #{TOKEN_KEY}"
            ))),
            (false, Some(token)) => Err(RenderError::invalid_structure(format!(
                "#{TOKEN_KEY} {token} on a node that is not deferred"
            ))),
            (false, None) => Ok(match theme {
                Some(template) => Self::Themed(ThemedNode {
                    template,
                    attached,
                    fields,
                }),
                None => Self::Map(MapNode { attached, fields }),
            }),
        }
    }

    /// Convert into a plain JSON value with `#`-prefixed directive keys.
    ///
    /// Keys come out sorted, which makes the result suitable for snapshots
    /// that must not depend on build order.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(scalar) => scalar.to_json(),
            Self::Markup(markup) => Value::String(markup.as_str().to_string()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(MapNode { attached, fields }) => {
                let mut object = fields_to_json(fields);
                if !attached.is_empty() {
                    object.insert(directive_key(ATTACHED_KEY), attached_to_json(attached));
                }
                sorted_object(object)
            }
            Self::Themed(ThemedNode {
                template,
                attached,
                fields,
            }) => {
                let mut object = fields_to_json(fields);
                object.insert(directive_key(THEME_KEY), Value::String(template.clone()));
                object.insert(directive_key(ATTACHED_KEY), attached_to_json(attached));
                sorted_object(object)
            }
            Self::Deferred(DeferredNode {
                token,
                attached,
                fields,
            }) => {
                let mut object = fields_to_json(fields);
                object.insert(directive_key(TYPE_KEY), Value::String(DEFERRED_TYPE.to_string()));
                object.insert(directive_key(TOKEN_KEY), Value::String(token.to_string()));
                if !attached.is_empty() {
                    object.insert(directive_key(ATTACHED_KEY), attached_to_json(attached));
                }
                sorted_object(object)
            }
        }
    }
}

/// Rebuild `object` with its keys in lexical order, whatever map type
/// `serde_json` was compiled with.
fn sorted_object(object: Map<String, Value>) -> Value {
    let mut entries: Vec<_> = object.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    Value::Object(entries.into_iter().collect())
}

fn directive_key(name: &str) -> String {
    format!("{DIRECTIVE_MARKER}{name}")
}

fn fields_to_json(fields: &Fields) -> Map<String, Value> {
    fields.iter().map(|(name, value)| (name.to_key(), value.to_json())).collect()
}

fn attached_to_json(attached: &[String]) -> Value {
    let mut object = Map::new();
    object.insert(
        LIBRARY_KEY.to_string(),
        Value::Array(attached.iter().cloned().map(Value::String).collect()),
    );
    Value::Object(object)
}

/// `#attached` accepts `{ library: [..] }` or a bare list of bundle names.
fn parse_attached(value: Value) -> Result<Vec<String>> {
    let list = match value {
        Value::Object(mut object) => object.remove(LIBRARY_KEY).unwrap_or(Value::Array(vec![])),
        other => other,
    };
    let items = match list {
        Value::Array(items) => items,
        other => {
            return Err(RenderError::invalid_structure(format!(
                "#{ATTACHED_KEY} must list bundle names, found {other}"
            )));
        }
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) => Ok(name),
            other => Err(RenderError::invalid_structure(format!(
                "bundle names must be strings, found {other}"
            ))),
        })
        .collect()
}

impl From<&str> for FieldName {
    fn from(key: &str) -> Self {
        Self::from_key(key)
    }
}

impl From<&str> for BuildNode {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for BuildNode {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

impl From<bool> for BuildNode {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for BuildNode {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(value.into()))
    }
}

impl From<Markup> for BuildNode {
    fn from(value: Markup) -> Self {
        Self::Markup(value)
    }
}

impl From<ThemedNode> for BuildNode {
    fn from(value: ThemedNode) -> Self {
        Self::Themed(value)
    }
}

impl From<Vec<BuildNode>> for BuildNode {
    fn from(value: Vec<BuildNode>) -> Self {
        Self::List(value)
    }
}
