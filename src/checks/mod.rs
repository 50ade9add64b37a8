//! Workspace contract checks
//!
//! All checks implement the `Check` trait and run through a `CheckRunner`.
//! Violations from every check are collected before anything is reported.
//!
//! # Built-in Checks
//!
//! - **required-scripts**: active workspaces declare `ci` (apps also `build` and `dev`)
//! - **ci-tasks-mirror**: `ciTasks` matches the `scripts.ci` chain
//! - **graph-cycles**: no dependency cycles between active workspaces

mod graph_cycles;
mod runner;
mod scripts;
mod trait_def;

pub use runner::create_default_runner;
pub use trait_def::{CheckContext, CheckResult};

use crate::core::error::{GateError, GateResult};
use serde::Serialize;

/// Outcome of the whole contract check
#[derive(Debug, Clone, Serialize)]
pub struct ContractReport {
  pub passed: bool,
  pub violations: Vec<String>,
  pub cycles: Vec<Vec<String>>,
  #[serde(skip)]
  pub results: Vec<CheckResult>,
}

impl ContractReport {
  /// `Err(Contract)` listing every violation, if any
  pub fn into_result(self) -> GateResult<()> {
    if self.passed {
      Ok(())
    } else {
      Err(GateError::Contract(self.violations))
    }
  }
}

/// Run every built-in check and merge their violations
pub fn run_contract(ctx: &CheckContext) -> ContractReport {
  let results = create_default_runner().run_all(ctx);

  let violations: Vec<String> = results.iter().flat_map(|r| r.violations.iter().cloned()).collect();
  let cycles = results
    .iter()
    .filter_map(|r| r.details.as_ref())
    .filter_map(|d| d.get("cycles"))
    .filter_map(|c| serde_json::from_value::<Vec<Vec<String>>>(c.clone()).ok())
    .flatten()
    .collect();

  ContractReport {
    passed: violations.is_empty(),
    violations,
    cycles,
    results,
  }
}
