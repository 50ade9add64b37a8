//! `affected-ci contract` - Validate workspace manifests against the CI contract

use crate::checks;
use crate::core::context::WorkspaceContext;
use crate::core::error::GateResult;

/// Run the contract command
///
/// Every violation is collected before anything is printed. Exit code 1 when
/// any check fails.
pub fn run_contract(ctx: &WorkspaceContext, json: bool) -> GateResult<()> {
  let report = checks::run_contract(&ctx.check_context());

  for result in &report.results {
    tracing::debug!(
      "{}: {} [{}] {}",
      result.check_name,
      if result.passed { "passed" } else { "failed" },
      result.severity,
      result.message
    );
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else if report.passed {
    println!("Workspace contract check passed.");
  }

  report.into_result()
}
