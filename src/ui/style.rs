//! Text styling for human-facing output
//!
//! Colors are decided once at startup (`set_color_enabled`) and then applied
//! through the small helpers below.

use anstyle::{AnsiColor, Color, Style};
use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_color_enabled(enabled: bool) {
  COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn color_enabled() -> bool {
  COLOR_ENABLED.load(Ordering::Relaxed)
}

fn paint(style: Style, text: &str) -> String {
  if color_enabled() {
    format!("{}{}{}", style.render(), text, style.render_reset())
  } else {
    text.to_string()
  }
}

/// Section titles (`Detected Changes`, `Project tasks`)
pub fn header(text: &str) -> String {
  paint(
    Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
    text,
  )
}

/// Workspace labels
pub fn subheader(text: &str) -> String {
  paint(Style::new().bold(), text)
}

pub fn muted(text: &str) -> String {
  paint(Style::new().dimmed(), text)
}

pub fn success(text: &str) -> String {
  paint(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))), text)
}

pub fn failure(text: &str) -> String {
  paint(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))), text)
}
