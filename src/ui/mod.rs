//! Human-facing output: styles, step lines, terminal state
//!
//! Diagnostics go through `tracing` to stderr; everything in here writes the
//! user-facing progress report to stdout.

pub mod progress;
pub mod style;
pub mod terminal;

pub use progress::{OutputMode, StepLine};
pub use terminal::{TerminalGuard, install_signal_handler};

/// Blank line, then a styled section header
pub fn section(title: &str) {
  println!("\n{}", style::header(title));
}

/// Blank line, then a workspace label
pub fn workspace_label(label: &str) {
  println!("\n{}", style::subheader(label));
}

pub fn note(text: &str) {
  println!("{}", style::muted(text));
}
