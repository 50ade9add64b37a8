//! `affected-ci ci` - Run CI for the affected workspaces
//!
//! Detects changes, then hands the result to the dispatcher with a process
//! executor. The cursor is hidden for the duration of an interactive run.

use crate::changes::ChangeSourceConfig;
use crate::core::context::WorkspaceContext;
use crate::core::error::GateResult;
use crate::dispatch::{CiOptions, Dispatcher};
use crate::runner::ProcessExecutor;
use crate::ui::{OutputMode, TerminalGuard};
use std::io::IsTerminal;

/// Run the ci command
pub fn run_ci(ctx: &WorkspaceContext, changes: &ChangeSourceConfig, options: CiOptions) -> GateResult<()> {
  let affected = ctx.detect(changes)?;
  tracing::info!(
    "{} app(s), {} package(s) affected, system change: {}",
    affected.apps.len(),
    affected.packages.len(),
    affected.system_changes
  );

  let mode = OutputMode::detect(options.is_ci, std::io::stdout().is_terminal());
  let _guard = TerminalGuard::acquire(mode == OutputMode::Interactive);

  let executor = ProcessExecutor::new(ctx.workspace_root(), ctx.config.runner.clone(), mode);
  Dispatcher::new(ctx, &affected, options, executor, mode).run()
}
