//! Component builds: build structures, the build registry and components.
//!
//! - [`node`] - the [`BuildNode`] tree a component build produces
//! - [`registry`] - [`BuildRegistry`], the arena of deferred builds behind [`BuildToken`]s
//! - [`component`] - the [`Component`] trait, [`ComponentDefinition`]s and
//!   data-driven [`DeclaredComponent`]s

pub mod component;
pub mod node;
pub mod registry;

pub use component::{
    Component, ComponentDefinition, ComponentDefinitions, DeclaredComponent, SlotValue, Slots,
    slot_variable_name,
};
pub use node::{BuildNode, DeferredNode, FieldName, Fields, MapNode, Markup, Scalar, ThemedNode};
pub use registry::{BuildData, BuildRegistry, BuildToken};
