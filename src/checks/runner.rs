//! Check runner for executing contract checks

use super::trait_def::{Check, CheckContext, CheckResult};
use std::sync::Arc;

/// Check runner that executes multiple checks
pub struct CheckRunner {
  checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
  /// Create a new check runner
  fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check to the runner
  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all checks and collect results
  pub fn run_all(&self, ctx: &CheckContext) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for check in &self.checks {
      tracing::debug!("running check {} ({})", check.name(), check.description());
      match check.run(ctx) {
        Ok(result) => results.push(result),
        Err(err) => {
          // If a check itself fails to run, report it alongside the others
          results.push(CheckResult::error(check.name(), format!("Check failed to run: {}", err)));
        }
      }
    }

    results
  }
}

/// Create a runner with all built-in contract checks
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::scripts::RequiredScriptsCheck));
  runner.add_check(Arc::new(super::scripts::CiTasksMirrorCheck));
  runner.add_check(Arc::new(super::graph_cycles::GraphCyclesCheck));

  runner
}
