//! Check trait abstraction for workspace contract validation
//!
//! Every contract rule implements `Check`. A check never stops at the first
//! problem: it returns all of its violations so one run shows the complete
//! compliance picture.

use crate::core::config::GateConfig;
use crate::core::error::GateResult;
use crate::graph::WorkspaceGraph;
use crate::workspace::Inventory;
use serde::Serialize;
use std::fmt;

/// Severity level for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Error (blocking, must be fixed)
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// Result of running a check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
  /// Name of the check that ran
  pub check_name: String,
  /// Whether the check passed
  pub passed: bool,
  pub severity: Severity,
  /// Human-readable summary
  pub message: String,
  /// One line per problem found
  pub violations: Vec<String>,
  /// Additional metadata (for JSON output)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

impl CheckResult {
  /// Passing when `violations` is empty, failing otherwise
  pub fn from_violations(check_name: impl Into<String>, violations: Vec<String>) -> Self {
    let passed = violations.is_empty();
    let message = if passed {
      "no violations".to_string()
    } else {
      format!("{} violation(s)", violations.len())
    };
    Self {
      check_name: check_name.into(),
      passed,
      severity: if passed { Severity::Info } else { Severity::Error },
      message,
      violations,
      details: None,
    }
  }

  /// Create a failing check result with error severity
  pub fn error(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    let message = message.into();
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Error,
      violations: vec![message.clone()],
      message,
      details: None,
    }
  }

  /// Add details to the check result
  pub fn with_details(mut self, details: serde_json::Value) -> Self {
    self.details = Some(details);
    self
  }
}

/// Context passed to checks
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
  pub config: &'a GateConfig,
  pub inventory: &'a Inventory,
  pub graph: &'a WorkspaceGraph,
}

/// Contract check trait
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check and return a result
  fn run(&self, ctx: &CheckContext) -> GateResult<CheckResult>;
}
