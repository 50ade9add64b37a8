//! CI orchestrator
//!
//! Runs a [`DispatchPlan`] strictly in sequence:
//!
//! ```text
//! project tasks (+ ci:contract)  ->  Detected Changes  ->  packages  ->  apps
//! ```
//!
//! The first failing task ends the run. Nothing after it is started.

use super::plan::{self, CiOptions, DispatchPlan, GroupPlan, WorkspaceAction, group_title};
use super::reason::TriggerReason;
use crate::checks;
use crate::core::context::WorkspaceContext;
use crate::core::error::GateResult;
use crate::graph::AffectedResult;
use crate::runner::{TaskExecutor, TaskRequest};
use crate::ui::{self, OutputMode, StepLine, style};
use crate::utils::path_matches;

/// Name of the built-in project step that validates the workspace contract
pub const CONTRACT_STEP: &str = "ci:contract";

pub struct Dispatcher<'a, E: TaskExecutor> {
  ctx: &'a WorkspaceContext,
  affected: &'a AffectedResult,
  options: CiOptions,
  executor: E,
  mode: OutputMode,
  /// Label of the section currently running, for the failure line
  current: String,
}

impl<'a, E: TaskExecutor> Dispatcher<'a, E> {
  pub fn new(
    ctx: &'a WorkspaceContext,
    affected: &'a AffectedResult,
    options: CiOptions,
    executor: E,
    mode: OutputMode,
  ) -> Self {
    Self {
      ctx,
      affected,
      options,
      executor,
      mode,
      current: String::new(),
    }
  }

  /// Plan, then execute. Prints `CI failed: <label>` before returning an error.
  pub fn run(&mut self) -> GateResult<()> {
    let ctx = self.ctx;
    let plan = plan::plan(&ctx.inventory, self.affected, &self.options)?;

    let result = self.execute(&plan);
    if result.is_err() && !self.current.is_empty() {
      println!("\n{}", style::failure(&format!("CI failed: {}", self.current)));
    }
    result
  }

  fn execute(&mut self, plan: &DispatchPlan) -> GateResult<()> {
    if plan.groups.project {
      self.run_project(plan.run_project_tasks)?;
    }

    self.print_detected_changes();

    if let Some(group) = &plan.packages {
      self.run_group(group)?;
    }
    if let Some(group) = &plan.apps {
      self.run_group(group)?;
    }

    println!("\n{}\n", style::header(self.options.finish_message()));
    Ok(())
  }

  fn run_project(&mut self, run: bool) -> GateResult<()> {
    ui::section("Project tasks");
    self.current = "Project tasks".to_string();

    if !run {
      ui::note("- Skipping CI");
      return Ok(());
    }

    let ctx = self.ctx;
    for task in &ctx.config.project_tasks {
      self.executor.execute(&TaskRequest::project(task))?;
    }
    self.run_contract_step()
  }

  /// The contract check runs in-process, rendered like any other step
  fn run_contract_step(&mut self) -> GateResult<()> {
    let step = StepLine::begin(CONTRACT_STEP, "affected-ci contract", self.mode);
    let report = checks::run_contract(&self.ctx.check_context());

    if report.passed {
      step.succeed();
    } else {
      step.fail();
      self.current = CONTRACT_STEP.to_string();
    }
    report.into_result()
  }

  fn run_group(&mut self, group: &GroupPlan) -> GateResult<()> {
    if !group.has_triggered() {
      ui::workspace_label(&format!(
        "{} - {}",
        group_title(group.kind),
        TriggerReason::NoChangeDetected
      ));
      ui::note("- Skipping CI");
      return Ok(());
    }

    for wp in &group.workspaces {
      let label = wp.label();
      ui::workspace_label(&label);
      self.current = label;

      match wp.action {
        WorkspaceAction::Skip => ui::note("- Skipping CI"),
        WorkspaceAction::SkipInactive => ui::note("- Skipping CI (inactive)"),
        WorkspaceAction::Run(tasks) => {
          for task in tasks {
            self
              .executor
              .execute(&TaskRequest::workspace(&wp.workspace.dir, task))?;
          }
        }
      }
    }
    Ok(())
  }

  fn print_detected_changes(&self) {
    let affected = self.affected;
    let list_or_none = |items: &[String]| {
      if items.is_empty() {
        "no change".to_string()
      } else {
        items.join(", ")
      }
    };

    ui::section("Detected Changes");
    println!(
      "- System files: {}",
      if affected.system_changes { "changed" } else { "no change" }
    );
    println!("- Packages: {}", list_or_none(&affected.changed_packages));
    println!("- Apps: {}", list_or_none(&affected.changed_apps));

    let apps_root = format!("{}/", self.ctx.config.apps_root);
    let packages_root = format!("{}/", self.ctx.config.packages_root);
    let (mut system, mut packages, mut apps) = (Vec::new(), Vec::new(), Vec::new());
    for file in &affected.changed_files {
      if path_matches(file, &apps_root) {
        apps.push(file);
      } else if path_matches(file, &packages_root) {
        packages.push(file);
      } else {
        system.push(file);
      }
    }

    for (title, files) in [
      ("System Changed Files", system),
      ("Packages Changed Files", packages),
      ("Apps Changed Files", apps),
    ] {
      if files.is_empty() {
        continue;
      }
      ui::section(title);
      for file in files {
        println!("- {}", file);
      }
    }

    if !affected.system_changes && !affected.package_impacts.is_empty() {
      ui::section("Package Impacts");
      for impact in &affected.package_impacts {
        let apps = if impact.apps.is_empty() {
          "no dependent apps".to_string()
        } else {
          impact.apps.join(", ")
        };
        println!("- {} → {}", impact.package, apps);
      }
    }
  }
}
