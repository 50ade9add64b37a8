//! `affected-ci run <task>` - Run one task for every affected app
//!
//! `type-check` skips apps without any TypeScript source, so apps written in
//! plain JavaScript don't fail on a missing `tsconfig.json`.

use crate::changes::ChangeSourceConfig;
use crate::core::context::WorkspaceContext;
use crate::core::error::{GateResult, ResultExt};
use crate::runner::{ProcessExecutor, TaskExecutor, TaskRequest};
use crate::ui::OutputMode;
use crate::workspace::WorkspaceKind;
use std::fs;
use std::path::{Path, PathBuf};

const TYPE_CHECK: &str = "type-check";

/// Run the run command
pub fn run_task(ctx: &WorkspaceContext, changes: &ChangeSourceConfig, task: &str, mode: OutputMode) -> GateResult<()> {
  let affected = ctx.detect(changes)?;
  if affected.apps.is_empty() {
    println!("No affected apps detected. Skipping.");
    return Ok(());
  }

  let mut executor = ProcessExecutor::new(ctx.workspace_root(), ctx.config.runner.clone(), mode);

  for name in &affected.apps {
    let Some(app) = ctx.inventory.get(WorkspaceKind::App, name) else {
      continue;
    };

    if !app.is_active() {
      println!("\n▶ {} for {} (skipped: inactive)", task, app.dir);
      continue;
    }

    if task == TYPE_CHECK && !has_typescript_files(&ctx.root.join(&app.dir))? {
      println!("\n▶ {} for {} (skipped: no TS files)", task, app.dir);
      continue;
    }

    println!("\n▶ {} for {}", task, app.dir);
    executor.execute(&TaskRequest::workspace(&app.dir, task))?;
  }

  Ok(())
}

/// Any `.ts` or `.tsx` file anywhere below `dir` (symlinks are not followed)
fn has_typescript_files(dir: &Path) -> GateResult<bool> {
  let mut stack: Vec<PathBuf> = vec![dir.to_path_buf()];

  while let Some(current) = stack.pop() {
    let entries = fs::read_dir(&current).with_context(|| format!("Failed to list {}", current.display()))?;
    for entry in entries {
      let entry = entry.with_context(|| format!("Failed to list {}", current.display()))?;
      let file_type = entry.file_type()?;
      let path = entry.path();

      if file_type.is_dir() {
        stack.push(path);
      } else if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "ts" || ext == "tsx")
      {
        return Ok(true);
      }
    }
  }

  Ok(false)
}
