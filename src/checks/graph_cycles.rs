//! Dependency cycle detection check
//!
//! Validates that the workspace dependency graph (active workspaces only) is
//! acyclic. Cycles are reported, not fatal on their own: the other contract
//! checks still run and report in the same pass.

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::GateResult;

/// Check for dependency cycles between workspaces
pub struct GraphCyclesCheck;

impl Check for GraphCyclesCheck {
  fn name(&self) -> &str {
    "graph-cycles"
  }

  fn description(&self) -> &str {
    "Detect dependency cycles between workspaces"
  }

  fn run(&self, ctx: &CheckContext) -> GateResult<CheckResult> {
    let cycles = ctx.graph.find_cycles();

    let violations = cycles
      .iter()
      .map(|cycle| format!("workspace dependency cycle detected: {}", cycle.join(" -> ")))
      .collect();

    Ok(
      CheckResult::from_violations(self.name(), violations).with_details(serde_json::json!({
        "cycles": cycles,
        "edges": ctx.graph.forward_edges(),
      })),
    )
  }
}
