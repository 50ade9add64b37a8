//! Task step lines
//!
//! ```text
//! - [ ] lint  run: pnpm -C apps/web run lint     (pending, redrawn in place)
//! - [x] lint                                      (success)
//! - [!] lint                                      (failure)
//! ```
//!
//! Interactive terminals redraw the pending line in place. Everything else
//! (CI logs, pipes) gets one plain line per state change.

use super::style;
use super::terminal::{render_line, render_line_ln};

/// How step lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
  /// Redraw in place, capture task output, spinner
  Interactive,
  /// Plain lines, task output captured
  Plain,
  /// `::group::` wrapped, task output streamed
  Ci,
}

impl OutputMode {
  pub fn detect(is_ci: bool, stdout_is_terminal: bool) -> Self {
    if is_ci {
      OutputMode::Ci
    } else if stdout_is_terminal {
      OutputMode::Interactive
    } else {
      OutputMode::Plain
    }
  }

  pub fn is_ci(self) -> bool {
    self == OutputMode::Ci
  }
}

pub fn format_pending(label: &str, detail: &str) -> String {
  format!("- [ ] {}  {}", label, style::muted(&format!("run: {}", detail)))
}

pub fn format_success(label: &str) -> String {
  format!("- {} {}", style::success("[x]"), label)
}

pub fn format_failure(label: &str) -> String {
  format!("- {} {}", style::failure("[!]"), label)
}

/// Output for a single task step
pub struct StepLine<'a> {
  label: &'a str,
  mode: OutputMode,
}

impl<'a> StepLine<'a> {
  /// Open the step: CI group marker plus the pending line
  pub fn begin(label: &'a str, command: &str, mode: OutputMode) -> Self {
    if mode.is_ci() {
      println!("::group::{}", label);
    }
    let step = Self { label, mode };
    match mode {
      OutputMode::Interactive => render_line(&format_pending(label, command)),
      OutputMode::Plain | OutputMode::Ci => println!("{}", format_pending(label, command)),
    }
    step
  }

  /// Replace the pending detail (interactive mode only)
  pub fn update(&self, detail: &str) {
    if self.mode == OutputMode::Interactive {
      render_line(&format_pending(self.label, detail));
    }
  }

  pub fn succeed(self) {
    self.finish(&format_success(self.label));
  }

  pub fn fail(self) {
    self.finish(&format_failure(self.label));
  }

  fn finish(&self, line: &str) {
    match self.mode {
      OutputMode::Interactive => render_line_ln(line),
      OutputMode::Plain => println!("{}", line),
      OutputMode::Ci => {
        println!("{}", line);
        println!("::endgroup::");
      }
    }
  }
}

/// Pending detail with the `.`, `..`, `...` suffix for a quiet task
pub fn spinner_detail(last_line: &str, tick: usize) -> String {
  format!("{}{}", last_line, ".".repeat(tick % 4))
}
