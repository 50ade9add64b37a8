//! Workspace dependency graph built from package.json manifests + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A declares a dependency on B"
//! - **Nodes**: active workspaces that declare a `name` (apps and packages)
//! - **Edges**: runtime/optional/peer dependencies that resolve to another node;
//!   external packages never become nodes
//! - **Reverse dependents**: package name → apps depending on it, one hop only
//!
//! Propagation is deliberately limited to a single package → app hop. A package
//! depending on a changed package is not widened into the affected set; the
//! forward graph exists for cycle detection, not for transitive impact.

use super::cycles;
use crate::workspace::{Inventory, Workspace, WorkspaceKind};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Package declared name → directory names of apps that depend on it
pub type ReverseDependents = BTreeMap<String, BTreeSet<String>>;

/// A workspace node in the dependency graph
#[derive(Debug, Clone)]
pub struct WorkspaceNode {
  /// `name` from package.json
  pub name: String,
  pub kind: WorkspaceKind,
  /// Directory name under its root
  pub dir_name: String,
}

impl AsRef<str> for WorkspaceNode {
  fn as_ref(&self) -> &str {
    &self.name
  }
}

/// Forward graph plus the one-hop reverse index used for impact propagation
pub struct WorkspaceGraph {
  graph: DiGraph<WorkspaceNode, ()>,
  reverse: ReverseDependents,
}

impl WorkspaceGraph {
  /// Build both directions from the inventory. Never mutates the inventory.
  pub fn build(inventory: &Inventory) -> Self {
    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();

    for ws in inventory.iter().filter(|ws| ws.is_active()) {
      let Some(name) = ws.declared_name() else {
        tracing::debug!("{} has no declared name, left out of the graph", ws.dir);
        continue;
      };
      if name_to_node.contains_key(name) {
        tracing::warn!("duplicate workspace name '{}' at {}, keeping the first", name, ws.dir);
        continue;
      }

      let idx = graph.add_node(WorkspaceNode {
        name: name.to_string(),
        kind: ws.kind,
        dir_name: ws.name.clone(),
      });
      name_to_node.insert(name.to_string(), idx);
    }

    for ws in inventory.iter().filter(|ws| ws.is_active()) {
      let Some(from) = ws.declared_name().and_then(|n| name_to_node.get(n)).copied() else {
        continue;
      };
      if graph[from].dir_name != ws.name || graph[from].kind != ws.kind {
        // the duplicate that lost the name slot
        continue;
      }
      for dep in ws.manifest.dependency_names() {
        if let Some(&to) = name_to_node.get(dep) {
          graph.add_edge(from, to, ());
        }
      }
    }

    let reverse = build_reverse_dependents(inventory);

    tracing::debug!(
      "workspace graph: {} node(s), {} edge(s), {} package(s) with dependents",
      graph.node_count(),
      graph.edge_count(),
      reverse.len()
    );

    Self { graph, reverse }
  }

  /// Apps (directory names) that declare a dependency on the package with this declared name
  pub fn dependents_of(&self, package_name: &str) -> Option<&BTreeSet<String>> {
    self.reverse.get(package_name)
  }

  pub fn reverse_dependents(&self) -> &ReverseDependents {
    &self.reverse
  }

  /// Forward adjacency as declared names, targets in node order
  pub fn forward_edges(&self) -> BTreeMap<String, Vec<String>> {
    self
      .graph
      .node_indices()
      .map(|idx| {
        let mut targets: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        targets.sort();
        (
          self.graph[idx].name.clone(),
          targets.into_iter().map(|t| self.graph[t].name.clone()).collect(),
        )
      })
      .collect()
  }

  /// Dependency cycles, each as `[A, B, ..., A]`
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    cycles::find_cycles(&self.graph)
  }

  pub fn node_count(&self) -> usize {
    self.graph.node_count()
  }
}

/// Package name → dependent apps
///
/// For each active app and each of its declared dependency names, add an edge when
/// the name belongs to an active package.
pub fn build_reverse_dependents(inventory: &Inventory) -> ReverseDependents {
  let packages: HashMap<&str, &Workspace> = inventory
    .packages()
    .iter()
    .filter(|pkg| pkg.is_active())
    .filter_map(|pkg| pkg.declared_name().map(|name| (name, pkg)))
    .collect();

  let mut reverse = ReverseDependents::new();
  for app in inventory.apps().iter().filter(|app| app.is_active()) {
    for dep in app.manifest.dependency_names() {
      if packages.contains_key(dep) {
        reverse.entry(dep.to_string()).or_default().insert(app.name.clone());
      }
    }
  }
  reverse
}
