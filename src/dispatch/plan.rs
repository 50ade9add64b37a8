//! Dispatch planning: which groups run, and what happens to each workspace
//!
//! Planning is pure. Every workspace gets its trigger reason and action before
//! a single task starts, so a missing `ciTasks` pipeline is reported for all
//! workspaces at once instead of halfway through a run.

use super::reason::{TriggerFacts, TriggerReason};
use crate::core::error::{GateError, GateResult};
use crate::graph::AffectedResult;
use crate::workspace::{Inventory, Workspace, WorkspaceKind};
use std::collections::BTreeSet;

/// Operator switches for one `ci` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CiOptions {
  pub project_only: bool,
  pub apps_only: bool,
  pub packages_only: bool,
  pub force_full: bool,
  /// Running under CI (`CI=true`)
  pub is_ci: bool,
}

/// Selected groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groups {
  pub project: bool,
  pub packages: bool,
  pub apps: bool,
}

impl CiOptions {
  /// The `--*-only` flags select groups (union); none given selects all three
  pub fn groups(&self) -> Groups {
    if !(self.project_only || self.apps_only || self.packages_only) {
      return Groups {
        project: true,
        packages: true,
        apps: true,
      };
    }
    Groups {
      project: self.project_only,
      packages: self.packages_only,
      apps: self.apps_only,
    }
  }

  /// Project tasks are gated separately from workspace change detection
  pub fn runs_project_tasks(&self, system_changed: bool) -> bool {
    self.is_ci || self.force_full || self.project_only || system_changed
  }

  pub fn finish_message(&self) -> &'static str {
    match (self.project_only, self.packages_only, self.apps_only) {
      (true, false, false) => "Project only check finished.",
      (false, true, false) => "Package only check finished.",
      (false, false, true) => "Apps only check finished.",
      _ => "Full CI check finished.",
    }
  }
}

/// What the orchestrator does with one workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceAction<'a> {
  /// `NoChangeDetected`
  Skip,
  /// A run state, but the workspace opted out via `workspaceStatus`
  SkipInactive,
  /// Run the declared pipeline in order
  Run(&'a [String]),
}

#[derive(Debug, Clone)]
pub struct WorkspacePlan<'a> {
  pub workspace: &'a Workspace,
  pub reason: TriggerReason,
  pub action: WorkspaceAction<'a>,
}

impl WorkspacePlan<'_> {
  pub fn label(&self) -> String {
    workspace_label(self.workspace.kind, &self.workspace.name, self.reason)
  }
}

/// `web - Detected Change`, `Package ui - Detected Change`
pub fn workspace_label(kind: WorkspaceKind, name: &str, reason: TriggerReason) -> String {
  match kind {
    WorkspaceKind::App => format!("{} - {}", name, reason),
    WorkspaceKind::Package => format!("Package {} - {}", name, reason),
  }
}

/// Group title used when nothing in the group runs
pub fn group_title(kind: WorkspaceKind) -> &'static str {
  match kind {
    WorkspaceKind::App => "App",
    WorkspaceKind::Package => "Package",
  }
}

#[derive(Debug, Clone)]
pub struct GroupPlan<'a> {
  pub kind: WorkspaceKind,
  pub workspaces: Vec<WorkspacePlan<'a>>,
}

impl GroupPlan<'_> {
  /// At least one workspace is in a run state
  pub fn has_triggered(&self) -> bool {
    self.workspaces.iter().any(|wp| wp.reason.should_run())
  }
}

/// Everything one `ci` invocation will do
#[derive(Debug, Clone)]
pub struct DispatchPlan<'a> {
  pub groups: Groups,
  pub run_project_tasks: bool,
  pub packages: Option<GroupPlan<'a>>,
  pub apps: Option<GroupPlan<'a>>,
}

/// Decide reasons and actions for every selected workspace.
///
/// Fails with `Contract` listing every active, triggered workspace that has no
/// `ciTasks` pipeline.
pub fn plan<'a>(inventory: &'a Inventory, affected: &AffectedResult, options: &CiOptions) -> GateResult<DispatchPlan<'a>> {
  let groups = options.groups();
  let mut violations = Vec::new();

  let packages = groups
    .packages
    .then(|| plan_group(WorkspaceKind::Package, inventory, affected, options, &mut violations));
  let apps = groups
    .apps
    .then(|| plan_group(WorkspaceKind::App, inventory, affected, options, &mut violations));

  if !violations.is_empty() {
    return Err(GateError::Contract(violations));
  }

  Ok(DispatchPlan {
    groups,
    run_project_tasks: groups.project && options.runs_project_tasks(affected.system_changes),
    packages,
    apps,
  })
}

fn plan_group<'a>(
  kind: WorkspaceKind,
  inventory: &'a Inventory,
  affected: &AffectedResult,
  options: &CiOptions,
  violations: &mut Vec<String>,
) -> GroupPlan<'a> {
  let (all, changed) = match kind {
    WorkspaceKind::App => (&affected.all_apps, &affected.changed_apps),
    WorkspaceKind::Package => (&affected.all_packages, &affected.changed_packages),
  };
  let changed: BTreeSet<&str> = changed.iter().map(String::as_str).collect();
  let via_dependency = match kind {
    WorkspaceKind::App => affected.dependency_apps(),
    WorkspaceKind::Package => BTreeSet::new(),
  };

  let mut workspaces = Vec::new();
  for name in all {
    let Some(workspace) = inventory.get(kind, name) else {
      tracing::warn!("{} {} is in the affected result but not in the inventory", kind, name);
      continue;
    };

    let reason = TriggerReason::decide(TriggerFacts {
      force_full: options.force_full,
      system_changed: affected.system_changes,
      via_dependency: via_dependency.contains(name.as_str()),
      directly_changed: changed.contains(name.as_str()),
    });
    tracing::debug!("{} {}: {:?}", kind, name, reason);

    let action = if !reason.should_run() {
      WorkspaceAction::Skip
    } else if !workspace.is_active() {
      WorkspaceAction::SkipInactive
    } else {
      match workspace.ci_tasks() {
        Some(tasks) if !tasks.is_empty() => WorkspaceAction::Run(tasks),
        _ => {
          violations.push(format!("{} {} has no declared task pipeline (ciTasks)", kind, name));
          WorkspaceAction::Skip
        }
      }
    };

    workspaces.push(WorkspacePlan {
      workspace,
      reason,
      action,
    });
  }

  GroupPlan { kind, workspaces }
}
