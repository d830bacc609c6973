//! Build registry: deferred component builds keyed by opaque tokens.
//!
//! When a component nests another component, the nested build is not inlined.
//! Its slots are stored here and a [`BuildToken`] takes its place in the
//! parent's build structure. Materialisation later asks the registry to
//! [`resolve`](BuildRegistry::resolve) the token back into a shallow
//! [`ThemedNode`].
//!
//! The registry is a generational arena: a token is an index into the entry
//! list plus the generation of the registry pass that minted it. Tokens from
//! another registry, or from an earlier pass of this one, are rejected.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::component::{Component, ComponentDefinitions, Slots};
use super::node::{BuildNode, FieldName, ThemedNode};
use crate::core::{RenderError, Result};

/// Process-wide generation counter so no two passes share a token namespace.
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

fn next_generation() -> u32 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Index for the next token of a pass holding `registered` builds.
fn token_index(generation: u32, registered: usize) -> Result<u32> {
    u32::try_from(registered).map_err(|_| RenderError::RegistryExhausted {
        generation,
        registered,
    })
}

/// Opaque handle to a deferred build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildToken {
    generation: u32,
    index: u32,
}

impl BuildToken {
    pub(crate) const fn new(generation: u32, index: u32) -> Self {
        Self { generation, index }
    }
}

impl fmt::Display for BuildToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.generation, self.index)
    }
}

impl FromStr for BuildToken {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let parse = || -> Option<Self> {
            let (generation, index) = s.split_once(':')?;
            Some(Self::new(generation.parse().ok()?, index.parse().ok()?))
        };
        parse().ok_or_else(|| RenderError::invalid_structure(format!("malformed build token '{s}'")))
    }
}

/// A nested component's build, captured when it was deferred.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildData {
    /// Component identity.
    pub resource: String,
    /// Built slot values by slot name.
    pub slots: Slots,
}

/// Stores deferred builds for one rendering pass.
#[derive(Debug)]
pub struct BuildRegistry {
    definitions: Arc<ComponentDefinitions>,
    generation: u32,
    entries: Vec<BuildData>,
}

impl BuildRegistry {
    pub fn new(definitions: Arc<ComponentDefinitions>) -> Self {
        Self {
            definitions,
            generation: next_generation(),
            entries: Vec::new(),
        }
    }

    /// The component definitions used to resolve tokens.
    pub fn definitions(&self) -> &ComponentDefinitions {
        &self.definitions
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of builds registered in the current pass.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a new rendering pass.
    ///
    /// Drops every stored build; tokens minted before this call become stale.
    pub fn begin_pass(&mut self) {
        self.entries.clear();
        self.generation = next_generation();
        tracing::debug!("Build registry started pass {}", self.generation);
    }

    /// Store a deferred build and mint its token.
    ///
    /// # Errors
    ///
    /// [`RenderError::RegistryExhausted`] once the pass holds as many builds
    /// as a token index can address; tokens are never reused.
    pub fn register(&mut self, resource: impl Into<String>, slots: Slots) -> Result<BuildToken> {
        let index = token_index(self.generation, self.entries.len())?;
        let token = BuildToken::new(self.generation, index);
        let resource = resource.into();
        tracing::trace!("Registered build {token} for '{resource}'");
        self.entries.push(BuildData { resource, slots });
        Ok(token)
    }

    /// Build `component` and defer it, returning the placeholder node.
    ///
    /// Nested components reached while building register themselves in turn.
    pub fn defer(&mut self, component: &dyn Component) -> Result<BuildNode> {
        let slots = component.build(self)?;
        let token = self.register(component.identity(), slots)?;
        Ok(BuildNode::deferred(token))
    }

    /// Look up the build data behind a token.
    pub fn get(&self, token: BuildToken) -> Result<&BuildData> {
        if token.generation != self.generation {
            return Err(RenderError::StaleToken {
                token,
                generation: self.generation,
            });
        }
        self.entries.get(token.index as usize).ok_or(RenderError::UnknownToken { token })
    }

    /// Resolve a token into a shallow themed node.
    ///
    /// The node's template key is the component identity, its attachments
    /// are the component's bundles and each declared slot becomes a directive
    /// field named after the slot (renamed, then snake_cased). Slots that
    /// were never built resolve to null.
    ///
    /// # Errors
    ///
    /// - [`RenderError::UnknownToken`] / [`RenderError::StaleToken`] if the token is not ours
    /// - [`RenderError::MissingDefinition`] if the component has no definition
    /// - [`RenderError::UnsupportedResource`] if the build filled a slot the
    ///   definition does not declare, or the definition maps a slot onto a
    ///   reserved or already used variable name
    pub fn resolve(&self, token: BuildToken) -> Result<ThemedNode> {
        let data = self.get(token)?;
        let definition = self.definitions.get(&data.resource).ok_or_else(|| {
            RenderError::MissingDefinition {
                resource: data.resource.clone(),
            }
        })?;

        if let Some(undeclared) = data.slots.keys().find(|slot| !definition.declares(slot)) {
            return Err(RenderError::UnsupportedResource {
                resource: data.resource.clone(),
                reason: format!("slot '{undeclared}' is not declared"),
            });
        }
        let variables = definition.variables().map_err(|reason| {
            RenderError::UnsupportedResource {
                resource: data.resource.clone(),
                reason,
            }
        })?;

        let mut node = ThemedNode::new(definition.name.clone());
        node.attached = definition.bundles.clone();
        for (slot, variable) in variables {
            let value = data.slots.get(slot).cloned().unwrap_or_else(BuildNode::null);
            node.fields.insert(FieldName::Directive(variable), value);
        }

        tracing::debug!(
            "Resolved token {token} to '{}' with {} slot(s)",
            node.template,
            node.fields.len()
        );
        Ok(node)
    }
}
