//! Asset bundles: declarations, the dependency graph and resolved file sets.
//!
//! Bundle declarations are static for a run. [`AssetGraph::resolve`] turns
//! them into [`ResolvedLibraries`] once; each render pass then collects the
//! files for the bundles it touched with [`ResolvedLibraries::collect`].

pub mod bundle;
pub mod graph;
pub mod resolved;

pub use bundle::{AssetBundle, BundleDeclarations, FileDefinition, FileSet};
pub use graph::AssetGraph;
pub use resolved::{AssetKind, PageAsset, PageAssets, ResolvedAssets, ResolvedLibraries};
