//! Task execution
//!
//! The dispatcher only knows "run task T for workspace W". A `TaskExecutor`
//! turns that into something that actually happens: `ProcessExecutor` spawns
//! the package manager (or the manifest script), tests substitute a recorder.

pub mod process;

pub use process::ProcessExecutor;

use crate::core::config::{RunnerConfig, RunnerKind};
use crate::core::error::{GateError, GateResult, TaskFailure};
use crate::workspace::{MANIFEST_FILE, Manifest};
use std::path::{Path, PathBuf};

/// One task to run, either at the monorepo root or inside a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRequest<'a> {
  pub task: &'a str,
  /// Workspace directory relative to the root (`apps/web`); `None` for project tasks
  pub dir: Option<&'a str>,
}

impl<'a> TaskRequest<'a> {
  pub fn project(task: &'a str) -> Self {
    Self { task, dir: None }
  }

  pub fn workspace(dir: &'a str, task: &'a str) -> Self {
    Self { task, dir: Some(dir) }
  }
}

/// Runs tasks; a non-zero exit must come back as `GateError::Task`
pub trait TaskExecutor {
  fn execute(&mut self, request: &TaskRequest) -> GateResult<()>;
}

impl<E: TaskExecutor + ?Sized> TaskExecutor for &mut E {
  fn execute(&mut self, request: &TaskRequest) -> GateResult<()> {
    (**self).execute(request)
  }
}

/// A fully resolved subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// What the pending line shows after `run:`
  pub display: String,
}

/// Resolve a request against the runner configuration
pub fn resolve_command(root: &Path, runner: &RunnerConfig, request: &TaskRequest) -> GateResult<TaskCommand> {
  match runner.kind {
    RunnerKind::PackageManager => {
      let mut args = Vec::new();
      if let Some(dir) = request.dir {
        args.push("-C".to_string());
        args.push(dir.to_string());
      }
      args.push("run".to_string());
      args.push(request.task.to_string());

      Ok(TaskCommand {
        display: format!("{} {}", runner.program, args.join(" ")),
        program: runner.program.clone(),
        args,
        cwd: root.to_path_buf(),
      })
    }
    RunnerKind::Script => {
      let cwd = match request.dir {
        Some(dir) => root.join(dir),
        None => root.to_path_buf(),
      };
      let manifest = Manifest::load(&cwd.join(MANIFEST_FILE))?;
      let script = manifest
        .scripts
        .get(request.task)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
          GateError::Task(TaskFailure {
            label: request.task.to_string(),
            command: format!(
              "{}/{} has no script \"{}\"",
              request.dir.unwrap_or("."),
              MANIFEST_FILE,
              request.task
            ),
            code: None,
          })
        })?;

      Ok(TaskCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        cwd,
        display: script.to_string(),
      })
    }
  }
}
