//! Components and their definitions.
//!
//! A [`Component`] is an identity plus a build function producing its slot
//! values. A [`ComponentDefinition`] says how that identity is themed: the
//! ordered slot names, the slot rename table and the asset bundles every
//! instance attaches. The template key of a component is its identity.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

use super::node::BuildNode;
use super::registry::BuildRegistry;
use crate::constants::RESERVED_VARIABLES;
use crate::core::Result;

/// Built slot values by slot name, in build order.
pub type Slots = IndexMap<String, BuildNode>;

/// Something that can be built into slot values.
pub trait Component {
    /// Component identity; doubles as the template key.
    fn identity(&self) -> &str;

    /// Build this component's slots.
    ///
    /// Nested components are deferred through `registry` and appear in the
    /// returned slots as deferred nodes.
    fn build(&self, registry: &mut BuildRegistry) -> Result<Slots>;
}

/// How a component identity maps onto a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    /// Component identity and template key.
    pub name: String,
    /// Declared slot names, in order.
    pub slots: Vec<String>,
    /// Slot name -> variable name overrides.
    pub renames: HashMap<String, String>,
    /// Asset bundles attached whenever the component renders.
    pub bundles: Vec<String>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            renames: HashMap::new(),
            bundles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots.extend(slots.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_rename(mut self, slot: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(slot.into(), to.into());
        self
    }

    #[must_use]
    pub fn with_bundles<I, S>(mut self, bundles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bundles.extend(bundles.into_iter().map(Into::into));
        self
    }

    pub fn declares(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s == slot)
    }

    /// The slot's name after the rename table is applied.
    pub fn renamed<'a>(&'a self, slot: &'a str) -> &'a str {
        self.renames.get(slot).map_or(slot, String::as_str)
    }

    /// Each declared slot paired with its template variable name, in slot
    /// order.
    ///
    /// # Errors
    ///
    /// A description of the problem if a slot maps onto a reserved variable
    /// name or two slots map onto the same one.
    pub fn variables(&self) -> std::result::Result<Vec<(&str, String)>, String> {
        let mut seen: HashMap<String, &str> = HashMap::with_capacity(self.slots.len());
        let mut variables = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let variable = slot_variable_name(self.renamed(slot));
            if RESERVED_VARIABLES.contains(&variable.as_str()) {
                return Err(format!("slot '{slot}' maps onto reserved variable '{variable}'"));
            }
            if let Some(previous) = seen.insert(variable.clone(), slot) {
                return Err(format!(
                    "slots '{previous}' and '{slot}' both map onto variable '{variable}'"
                ));
            }
            variables.push((slot.as_str(), variable));
        }
        Ok(variables)
    }
}

/// All known component definitions, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct ComponentDefinitions {
    definitions: IndexMap<String, ComponentDefinition>,
}

impl ComponentDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, definition: ComponentDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<ComponentDefinition> for ComponentDefinitions {
    fn from_iter<T: IntoIterator<Item = ComponentDefinition>>(iter: T) -> Self {
        let mut definitions = Self::new();
        for definition in iter {
            definitions.insert(definition);
        }
        definitions
    }
}

/// Convert a slot name into a template variable name.
///
/// camelCase becomes snake_case; names already in snake_case pass through.
pub fn slot_variable_name(slot: &str) -> String {
    let mut name = String::with_capacity(slot.len() + 4);
    let mut previous_lower = false;
    for c in slot.chars() {
        if c.is_uppercase() {
            if previous_lower {
                name.push('_');
            }
            name.extend(c.to_lowercase());
            previous_lower = false;
        } else {
            name.push(c);
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    name
}

/// A component declared as data, e.g. in a scenario file.
///
/// ```yaml
/// component: card
/// slots:
///   title: Hello
///   body:
///     component: paragraph
///     slots: { text: World }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclaredComponent {
    pub component: String,
    #[serde(default)]
    pub slots: IndexMap<String, SlotValue>,
}

/// A slot value in a [`DeclaredComponent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// A nested component; built and deferred.
    Component(DeclaredComponent),
    /// A list whose items may themselves be components.
    List(Vec<SlotValue>),
    /// Any other data, converted through [`BuildNode::from_json`].
    Value(serde_json::Value),
}

impl SlotValue {
    fn build(&self, registry: &mut BuildRegistry) -> Result<BuildNode> {
        match self {
            Self::Component(component) => registry.defer(component),
            Self::List(items) => Ok(BuildNode::List(
                items.iter().map(|item| item.build(registry)).collect::<Result<_>>()?,
            )),
            Self::Value(value) => BuildNode::from_json(value.clone()),
        }
    }
}

impl Component for DeclaredComponent {
    fn identity(&self) -> &str {
        &self.component
    }

    fn build(&self, registry: &mut BuildRegistry) -> Result<Slots> {
        build_slots(&self.slots, registry)
    }
}

/// Build declared slot values in order.
pub(crate) fn build_slots(
    slots: &IndexMap<String, SlotValue>,
    registry: &mut BuildRegistry,
) -> Result<Slots> {
    slots.iter().map(|(name, value)| Ok((name.clone(), value.build(registry)?))).collect()
}
