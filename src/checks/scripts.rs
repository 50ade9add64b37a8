//! Script contract checks
//!
//! - **required-scripts**: every active workspace declares the scripts its kind needs
//! - **ci-tasks-mirror**: `ciTasks` is a 1:1 mirror of the `scripts.ci` chain
//!
//! Inactive workspaces (`workspaceStatus: "inactive"`) are skipped entirely.

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::config::ContractConfig;
use crate::core::error::GateResult;
use crate::workspace::{Workspace, WorkspaceKind};

/// Every active workspace declares its kind's required scripts
pub struct RequiredScriptsCheck;

impl RequiredScriptsCheck {
  fn required<'a>(contract: &'a ContractConfig, ws: &Workspace) -> &'a [String] {
    match ws.kind {
      WorkspaceKind::App if ws.name == contract.infra_app => &contract.infra_scripts,
      WorkspaceKind::App => &contract.app_scripts,
      WorkspaceKind::Package => &contract.package_scripts,
    }
  }
}

impl Check for RequiredScriptsCheck {
  fn name(&self) -> &str {
    "required-scripts"
  }

  fn description(&self) -> &str {
    "Active workspaces declare the scripts CI relies on"
  }

  fn run(&self, ctx: &CheckContext) -> GateResult<CheckResult> {
    let mut violations = Vec::new();

    for ws in ctx.inventory.iter().filter(|ws| ws.is_active()) {
      for script in Self::required(&ctx.config.contract, ws) {
        if !ws.manifest.has_script(script) {
          violations.push(format!(
            "{} {} is missing script: {} (set workspaceStatus: \"inactive\" to skip)",
            ws.kind, ws.name, script
          ));
        }
      }
    }

    Ok(CheckResult::from_violations(self.name(), violations))
  }
}

/// `ciTasks` mirrors `scripts.ci` in order and contents
pub struct CiTasksMirrorCheck;

impl CiTasksMirrorCheck {
  fn violations_for(ws: &Workspace, program: &str) -> Vec<String> {
    let mut violations = Vec::new();
    let Some(ci_script) = ws.manifest.scripts.get("ci") else {
      return violations;
    };

    let ci_tasks = match ws.ci_tasks() {
      Some(tasks) if !tasks.is_empty() => tasks,
      _ => {
        violations.push(format!(
          "{} {} is missing ciTasks (required to mirror scripts.ci)",
          ws.kind, ws.name
        ));
        return violations;
      }
    };

    match parse_ci_chain(ci_script, program) {
      None => violations.push(format!(
        "{} {} has a ci script that is not a plain \"{} run <task>\" chain",
        ws.kind, ws.name, program
      )),
      Some(chain) if chain.as_slice() != ci_tasks => violations.push(format!(
        "{} {} ciTasks must match scripts.ci in order and contents",
        ws.kind, ws.name
      )),
      Some(_) => {}
    }

    for task in ci_tasks {
      if !ws.manifest.has_script(task) {
        violations.push(format!(
          "{} {} ciTasks references missing script: {}",
          ws.kind, ws.name, task
        ));
      }
    }

    violations
  }
}

impl Check for CiTasksMirrorCheck {
  fn name(&self) -> &str {
    "ci-tasks-mirror"
  }

  fn description(&self) -> &str {
    "ciTasks lists exactly the tasks scripts.ci chains together"
  }

  fn run(&self, ctx: &CheckContext) -> GateResult<CheckResult> {
    let program = ctx.config.runner.program.as_str();
    let violations = ctx
      .inventory
      .iter()
      .filter(|ws| ws.is_active())
      .flat_map(|ws| Self::violations_for(ws, program))
      .collect();

    Ok(CheckResult::from_violations(self.name(), violations))
  }
}

/// Parse `"pnpm run a && pnpm run b"` into `["a", "b"]`
///
/// Returns `None` when any step is not exactly `<program> run <task>`.
pub fn parse_ci_chain(script: &str, program: &str) -> Option<Vec<String>> {
  let prefix = format!("{} run ", program);

  script
    .split("&&")
    .map(str::trim)
    .filter(|step| !step.is_empty())
    .map(|step| {
      let task = step.strip_prefix(&prefix)?;
      let valid = !task.is_empty()
        && task
          .chars()
          .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-'));
      valid.then(|| task.to_string())
    })
    .collect()
}
