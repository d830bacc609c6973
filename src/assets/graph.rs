//! Asset bundle dependency graph.
//!
//! The graph is built once from the bundle declarations. Resolving it
//! computes, for every declared bundle, the transitive union of its own
//! files and the files of every bundle reachable through `depends_on`.
//!
//! Dependency names without a declaration are leaves with no assets. Cycles
//! are not detected up front: the recursion ceiling
//! ([`MAX_DEPENDENCY_DEPTH`]) turns them into a fatal error.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::bundle::{BundleDeclarations, merge_first_wins};
use super::resolved::{ResolvedAssets, ResolvedLibraries};
use crate::constants::MAX_DEPENDENCY_DEPTH;
use crate::core::{RenderError, Result};

/// Dependency graph over bundle names.
#[derive(Debug, Clone, Default)]
pub struct AssetGraph {
    /// Edges point from a bundle to the bundles it depends on.
    graph: DiGraph<String, ()>,
    /// Map from bundle names to their graph indices.
    node_map: HashMap<String, NodeIndex>,
    bundles: BundleDeclarations,
}

impl AssetGraph {
    /// Build the graph from bundle declarations.
    pub fn build(declarations: BundleDeclarations) -> Self {
        let mut graph = Self::default();
        for (name, bundle) in &declarations {
            let from = graph.ensure_node(name);
            for dependency in &bundle.depends_on {
                let to = graph.ensure_node(dependency);
                if !graph.graph.contains_edge(from, to) {
                    graph.graph.add_edge(from, to, ());
                }
            }
        }
        graph.bundles = declarations;
        tracing::debug!(
            "Built asset graph: {} bundle(s), {} node(s), {} edge(s)",
            graph.bundles.len(),
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Direct dependencies of `name`, in declaration order.
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(name) else {
            return Vec::new();
        };
        // petgraph walks edges newest first
        let mut names: Vec<&str> =
            self.graph.neighbors(index).map(|n| self.graph[n].as_str()).collect();
        names.reverse();
        names
    }

    /// Every bundle name reachable from `name`, in traversal order.
    ///
    /// A level lists a bundle's direct dependencies and then expands each
    /// declared one in turn, so names reachable along several paths appear
    /// more than once. The direct dependency list of `name` is level 1.
    ///
    /// # Errors
    ///
    /// [`RenderError::DependencyDepthExceeded`] when a level beyond the
    /// ceiling is reached.
    pub fn closure(&self, name: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.expand(name, name, 1, &mut names)?;
        Ok(names)
    }

    fn expand(&self, top: &str, current: &str, depth: usize, out: &mut Vec<String>) -> Result<()> {
        if depth > MAX_DEPENDENCY_DEPTH {
            return Err(RenderError::DependencyDepthExceeded {
                bundle: top.to_string(),
                deepest: current.to_string(),
                limit: MAX_DEPENDENCY_DEPTH,
            });
        }

        let dependencies = self.dependencies(current);
        out.extend(dependencies.iter().map(|d| (*d).to_string()));
        for dependency in dependencies {
            if self.is_declared(dependency) {
                self.expand(top, dependency, depth + 1, out)?;
            }
        }
        Ok(())
    }

    /// Resolve the merged assets of a single bundle.
    ///
    /// The bundle's own files come first, then each reachable bundle's files
    /// in traversal order; the first definition of a path wins.
    pub fn resolve_bundle(&self, name: &str) -> Result<ResolvedAssets> {
        let mut resolved = ResolvedAssets::default();
        if let Some(bundle) = self.bundles.get(name) {
            resolved.css = bundle.css.clone();
            resolved.js = bundle.js.clone();
        }

        for dependency in self.closure(name)? {
            if let Some(bundle) = self.bundles.get(&dependency) {
                merge_first_wins(&mut resolved.css, &bundle.css);
                merge_first_wins(&mut resolved.js, &bundle.js);
            }
        }
        Ok(resolved)
    }

    /// Resolve every declared bundle.
    ///
    /// # Errors
    ///
    /// Fails on the first bundle whose closure exceeds the recursion ceiling.
    pub fn resolve(&self) -> Result<ResolvedLibraries> {
        let mut resolved = indexmap::IndexMap::with_capacity(self.bundles.len());
        for name in self.bundles.keys() {
            let assets = self.resolve_bundle(name)?;
            tracing::trace!(
                "Resolved bundle '{name}': {} css, {} js",
                assets.css.len(),
                assets.js.len()
            );
            resolved.insert(name.clone(), assets);
        }
        Ok(ResolvedLibraries::new(resolved))
    }
}
