//! Unified workspace context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/affected.rs, ci.rs, contract.rs, ...:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```
//!
//! The inventory and graph are read-only after construction.

use crate::changes::{ChangeSource, ChangeSourceConfig};
use crate::checks::CheckContext;
use crate::core::config::GateConfig;
use crate::core::error::GateResult;
use crate::core::vcs::SystemGit;
use crate::graph::affected::{self, AffectedResult, RuleTable};
use crate::graph::WorkspaceGraph;
use crate::workspace::Inventory;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs to know about the monorepo
pub struct WorkspaceContext {
  /// Monorepo root directory (absolute path)
  pub root: PathBuf,

  /// affected.toml, or defaults
  pub config: Arc<GateConfig>,

  /// Apps and packages found at startup
  pub inventory: Inventory,

  /// Dependency graph (built from the inventory)
  pub graph: Arc<WorkspaceGraph>,

  /// Path classification rules (built from config)
  pub rules: RuleTable,
}

impl WorkspaceContext {
  /// Load config, scan the inventory and build the graph
  pub fn build(root: &Path) -> GateResult<Self> {
    let config = GateConfig::load(root)?;
    Self::with_config(root, config)
  }

  pub fn with_config(root: &Path, config: GateConfig) -> GateResult<Self> {
    let inventory = Inventory::scan(root, &config)?;
    Ok(Self::from_parts(root, config, inventory))
  }

  /// Assemble from an inventory that is already loaded
  pub fn from_parts(root: &Path, config: GateConfig, inventory: Inventory) -> Self {
    let graph = Arc::new(WorkspaceGraph::build(&inventory));
    let rules = RuleTable::new(&config);

    Self {
      root: root.to_path_buf(),
      config: Arc::new(config),
      inventory,
      graph,
      rules,
    }
  }

  /// Borrowed view handed to contract checks
  pub fn check_context(&self) -> CheckContext<'_> {
    CheckContext {
      config: &self.config,
      inventory: &self.inventory,
      graph: &self.graph,
    }
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }

  /// Changed files for this run, straight from git
  pub fn changed_files(&self, changes: &ChangeSourceConfig) -> GateResult<Vec<String>> {
    let git = SystemGit::open(&self.root)?;
    ChangeSource::new(git, changes.clone()).list_changed()
  }

  /// Classify an explicit file list against this snapshot
  pub fn resolve(&self, changed_files: &[String]) -> AffectedResult {
    affected::resolve(changed_files, &self.inventory, &self.graph, &self.rules)
  }

  /// Change detection end to end
  pub fn detect(&self, changes: &ChangeSourceConfig) -> GateResult<AffectedResult> {
    let files = self.changed_files(changes)?;
    Ok(self.resolve(&files))
  }
}
