//! Subprocess task executor
//!
//! One task at a time, blocking until it exits.
//!
//! - **CI**: output streams straight to the log inside a `::group::`
//! - **local**: output is captured; the pending line shows the task's latest
//!   output line (with a spinner while it is quiet). On failure the command is
//!   run once more with inherited output so the error is visible, and the
//!   original failure is what gets reported.

use super::{TaskCommand, TaskExecutor, TaskRequest, resolve_command};
use crate::core::config::RunnerConfig;
use crate::core::error::{GateError, GateResult, TaskFailure};
use crate::ui::progress::{StepLine, spinner_detail};
use crate::ui::OutputMode;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

const SPINNER_INTERVAL: Duration = Duration::from_secs(1);

/// Runs tasks as child processes of the monorepo root
pub struct ProcessExecutor {
  root: PathBuf,
  runner: RunnerConfig,
  mode: OutputMode,
}

impl ProcessExecutor {
  pub fn new(root: impl Into<PathBuf>, runner: RunnerConfig, mode: OutputMode) -> Self {
    Self {
      root: root.into(),
      runner,
      mode,
    }
  }

  fn command(cmd: &TaskCommand) -> Command {
    let mut command = Command::new(&cmd.program);
    command.args(&cmd.args).current_dir(&cmd.cwd).stdin(Stdio::null());
    command
  }

  fn run_streamed(cmd: &TaskCommand) -> std::io::Result<ExitStatus> {
    Self::command(cmd)
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()
  }

  fn run_captured(cmd: &TaskCommand, step: &StepLine) -> std::io::Result<ExitStatus> {
    let mut child = Self::command(cmd).stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

    let (tx, rx) = mpsc::channel::<String>();
    let readers: Vec<_> = [
      child.stdout.take().map(|s| forward_lines(s, tx.clone())),
      child.stderr.take().map(|s| forward_lines(s, tx.clone())),
    ]
    .into_iter()
    .flatten()
    .collect();
    drop(tx);

    let mut last_line = String::new();
    let mut tick = 0usize;
    loop {
      match rx.recv_timeout(SPINNER_INTERVAL) {
        Ok(line) => {
          last_line = line;
          tick = 0;
          step.update(&last_line);
        }
        Err(RecvTimeoutError::Timeout) => {
          if !last_line.is_empty() {
            tick += 1;
            step.update(&spinner_detail(&last_line, tick));
          }
        }
        Err(RecvTimeoutError::Disconnected) => break,
      }
    }

    for reader in readers {
      if reader.join().is_err() {
        tracing::debug!("output reader for {} panicked", cmd.display);
      }
    }
    child.wait()
  }
}

/// Send every non-blank line of `stream` to `tx` until EOF
fn forward_lines<R: Read + Send + 'static>(stream: R, tx: Sender<String>) -> thread::JoinHandle<()> {
  thread::spawn(move || {
    for chunk in BufReader::new(stream).split(b'\n') {
      let Ok(bytes) = chunk else { break };
      let line = String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string();
      if line.trim().is_empty() {
        continue;
      }
      if tx.send(line).is_err() {
        break;
      }
    }
  })
}

impl TaskExecutor for ProcessExecutor {
  fn execute(&mut self, request: &TaskRequest) -> GateResult<()> {
    let cmd = match resolve_command(&self.root, &self.runner, request) {
      Ok(cmd) => cmd,
      Err(GateError::Task(failure)) => {
        StepLine::begin(request.task, &failure.command, self.mode).fail();
        return Err(GateError::Task(failure));
      }
      Err(err) => return Err(err),
    };

    tracing::debug!("running {:?} {:?} in {}", cmd.program, cmd.args, cmd.cwd.display());
    let step = StepLine::begin(request.task, &cmd.display, self.mode);

    let status = if self.mode.is_ci() {
      Self::run_streamed(&cmd)
    } else {
      Self::run_captured(&cmd, &step)
    };

    let code = match status {
      Ok(status) if status.success() => {
        step.succeed();
        return Ok(());
      }
      Ok(status) => status.code(),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        step.fail();
        return Err(GateError::with_help(
          format!("Failed to start {}: {}", cmd.program, err),
          "Install it, or set [runner] kind = \"script\" in affected.toml to run package.json scripts directly.",
        ));
      }
      Err(err) => {
        tracing::error!("failed to start {}: {}", cmd.program, err);
        None
      }
    };

    step.fail();
    if !self.mode.is_ci() {
      // show the full output of the failing command
      if let Err(err) = Self::run_streamed(&cmd) {
        tracing::debug!("rerun of {} failed to start: {}", cmd.display, err);
      }
    }

    Err(GateError::Task(TaskFailure {
      label: request.task.to_string(),
      command: cmd.display,
      code,
    }))
  }
}
