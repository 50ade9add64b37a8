//! Terminal state owned by a run
//!
//! The only state we modify is cursor visibility. It is restored when the
//! guard drops (normal return, error return, panic unwinding) and from the
//! signal handler installed by `install_signal_handler`.

use crossterm::cursor;
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit status used after an interrupt (128 + SIGINT)
const INTERRUPTED_EXIT: i32 = 130;

/// Set while a guard has the cursor hidden; the signal handler only restores then
static CURSOR_HIDDEN: AtomicBool = AtomicBool::new(false);

/// Hides the cursor while alive (interactive runs only)
pub struct TerminalGuard {
  active: bool,
}

impl TerminalGuard {
  pub fn acquire(interactive: bool) -> Self {
    if !interactive {
      return Self { active: false };
    }
    if execute!(io::stdout(), cursor::Hide).is_err() {
      tracing::debug!("could not hide cursor; continuing without terminal guard");
      return Self { active: false };
    }
    CURSOR_HIDDEN.store(true, Ordering::SeqCst);
    Self { active: true }
  }
}

impl Drop for TerminalGuard {
  fn drop(&mut self) {
    if self.active {
      restore_cursor();
    }
  }
}

/// Show the cursor if a guard hid it; returns whether anything was written
fn restore_cursor() -> bool {
  if !CURSOR_HIDDEN.swap(false, Ordering::SeqCst) {
    return false;
  }
  let _ = execute!(io::stdout(), cursor::Show);
  true
}

/// Restore the cursor and exit on SIGINT, SIGTERM and SIGHUP
pub fn install_signal_handler() {
  let result = ctrlc::set_handler(|| {
    let _ = restore_cursor();
    std::process::exit(INTERRUPTED_EXIT);
  });
  if let Err(err) = result {
    tracing::warn!("failed to install signal handler: {}", err);
  }
}

/// Overwrite the current line without a trailing newline
pub fn render_line(text: &str) {
  let mut stdout = io::stdout();
  let _ = execute!(stdout, Print("\r"), Clear(ClearType::CurrentLine), Print(text));
  let _ = stdout.flush();
}

/// Overwrite the current line and move to the next one
pub fn render_line_ln(text: &str) {
  let mut stdout = io::stdout();
  let _ = execute!(
    stdout,
    Print("\r"),
    Clear(ClearType::CurrentLine),
    Print(text),
    Print("\n")
  );
  let _ = stdout.flush();
}
