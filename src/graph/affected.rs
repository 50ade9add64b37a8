//! Affected workspace analysis
//!
//! Given a set of changed files, determine:
//! - Which apps and packages directly contain those files
//! - Whether shared tooling changed (every workspace is then affected)
//! - Which apps depend on a changed package (one hop)
//!
//! Classification is an ordered rule table; the first matching rule wins:
//!
//! | # | Pattern | Outcome |
//! |---|---------|---------|
//! | 1 | `<apps_root>/<app>/...` | app `<app>` (unknown app dirs stay unattributed) |
//! | 2 | `<packages_root>/<pkg>/...`, `<pkg>` a package | package `<pkg>` |
//! | 3 | anything else under `<packages_root>/` | system-wide |
//! | 4 | system allowlist entry (exact or prefix) | system-wide |
//! | 5 | otherwise | recorded, unattributed |

use super::workspace_graph::WorkspaceGraph;
use crate::core::config::GateConfig;
use crate::utils::{path_matches, split_first_segment};
use crate::workspace::{Inventory, WorkspaceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a single changed path means for the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
  App(String),
  Package(String),
  System,
  Unattributed,
}

#[derive(Debug, Clone)]
enum Matcher {
  /// First path segment equals the root directory
  Root(String),
  /// Allowlist entry, exact or prefix
  Path(String),
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
  AppByDir,
  PackageByDir,
  System,
}

#[derive(Debug, Clone)]
struct Rule {
  matcher: Matcher,
  outcome: Outcome,
}

/// Ordered path classification rules
#[derive(Debug, Clone)]
pub struct RuleTable {
  rules: Vec<Rule>,
}

impl RuleTable {
  pub fn new(config: &GateConfig) -> Self {
    let mut rules = vec![
      Rule {
        matcher: Matcher::Root(config.apps_root.clone()),
        outcome: Outcome::AppByDir,
      },
      Rule {
        matcher: Matcher::Root(config.packages_root.clone()),
        outcome: Outcome::PackageByDir,
      },
    ];
    rules.extend(config.system_paths.iter().map(|entry| Rule {
      matcher: Matcher::Path(entry.clone()),
      outcome: Outcome::System,
    }));
    Self { rules }
  }

  /// Classify one normalized path against the inventory
  pub fn classify(&self, path: &str, inventory: &Inventory) -> Attribution {
    let (first, rest) = split_first_segment(path);

    for rule in &self.rules {
      let dir = match &rule.matcher {
        Matcher::Root(root) => match rest {
          Some(rest) if first == root => Some(split_first_segment(rest)),
          _ => continue,
        },
        Matcher::Path(entry) if path_matches(path, entry) => None,
        Matcher::Path(_) => continue,
      };

      return match (rule.outcome, dir) {
        (Outcome::AppByDir, Some((name, _))) => match inventory.get(WorkspaceKind::App, name) {
          Some(app) => Attribution::App(app.name.clone()),
          None => Attribution::Unattributed,
        },
        (Outcome::PackageByDir, Some((name, _))) => match inventory.get(WorkspaceKind::Package, name) {
          Some(pkg) => Attribution::Package(pkg.name.clone()),
          // stray files under the packages root are treated as infrastructure
          None => Attribution::System,
        },
        _ => Attribution::System,
      };
    }

    Attribution::Unattributed
  }
}

/// One changed package and the apps that depend on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageImpact {
  pub package: String,
  pub apps: Vec<String>,
}

/// The change-detection payload handed to the dispatcher (and printed as JSON)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedResult {
  /// Effective app list: everything on system change, else direct + dependents
  pub apps: Vec<String>,
  /// Effective package list: everything on system change, else directly changed
  pub packages: Vec<String>,
  pub system_changes: bool,
  /// Same value as `system_changes`, kept for callers reading the older key
  pub changed_systems: bool,
  pub package_impacts: Vec<PackageImpact>,
  pub changed_files: Vec<String>,
  pub all_apps: Vec<String>,
  pub all_packages: Vec<String>,
  pub changed_apps: Vec<String>,
  pub changed_packages: Vec<String>,
}

impl AffectedResult {
  /// Apps reached only through package → app propagation (or also directly)
  pub fn dependency_apps(&self) -> BTreeSet<&str> {
    self
      .package_impacts
      .iter()
      .flat_map(|impact| impact.apps.iter().map(String::as_str))
      .collect()
  }

  /// Nothing attributed and no system change
  pub fn is_empty(&self) -> bool {
    !self.system_changes && self.apps.is_empty() && self.packages.is_empty()
  }
}

/// Classify every changed file and apply the propagation rules.
///
/// Output lists are sorted, so the same files and manifests always give a
/// byte-identical result.
pub fn resolve(
  changed_files: &[String],
  inventory: &Inventory,
  graph: &WorkspaceGraph,
  rules: &RuleTable,
) -> AffectedResult {
  let mut changed_apps = BTreeSet::new();
  let mut changed_packages = BTreeSet::new();
  let mut system_changes = false;

  for file in changed_files {
    let attribution = rules.classify(file, inventory);
    tracing::debug!("{} → {:?}", file, attribution);
    match attribution {
      Attribution::App(name) => {
        changed_apps.insert(name);
      }
      Attribution::Package(name) => {
        changed_packages.insert(name);
      }
      Attribution::System => system_changes = true,
      Attribution::Unattributed => {}
    }
  }

  let all_apps = inventory.names(WorkspaceKind::App);
  let all_packages = inventory.names(WorkspaceKind::Package);

  let (apps, packages, package_impacts) = if system_changes {
    (all_apps.clone(), all_packages.clone(), Vec::new())
  } else {
    let mut apps: BTreeSet<String> = changed_apps.clone();
    let mut impacts = Vec::new();

    for package in &changed_packages {
      let dependents: Vec<String> = inventory
        .get(WorkspaceKind::Package, package)
        .and_then(|pkg| pkg.declared_name())
        .and_then(|name| graph.dependents_of(name))
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();

      apps.extend(dependents.iter().cloned());
      impacts.push(PackageImpact {
        package: package.clone(),
        apps: dependents,
      });
    }

    (
      apps.into_iter().collect(),
      changed_packages.iter().cloned().collect(),
      impacts,
    )
  };

  AffectedResult {
    apps,
    packages,
    system_changes,
    changed_systems: system_changes,
    package_impacts,
    changed_files: changed_files.to_vec(),
    all_apps,
    all_packages,
    changed_apps: changed_apps.into_iter().collect(),
    changed_packages: changed_packages.into_iter().collect(),
  }
}
