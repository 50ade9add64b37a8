//! Graph-aware workspace analysis
//!
//! Built on package.json manifests + petgraph. The forward graph feeds cycle
//! detection; the one-hop reverse index feeds affected propagation.

pub mod affected;
pub mod cycles;
pub mod workspace_graph;

pub use affected::{AffectedResult, PackageImpact, RuleTable};
pub use workspace_graph::WorkspaceGraph;
