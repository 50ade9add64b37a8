//! Why a workspace runs (or doesn't)

use serde::Serialize;
use std::fmt;

/// Per-workspace trigger, decided once per run
///
/// When several apply, the highest priority wins:
/// `ForceFullCi` > `SystemFilesChange` > `DependencyChange` > `DetectedChange` > `NoChangeDetected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TriggerReason {
  NoChangeDetected,
  DetectedChange,
  TriggeredFromDependencyChange,
  TriggeredFromSystemFilesChange,
  TriggeredFromForceFullCi,
}

/// The facts a reason is derived from
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerFacts {
  pub force_full: bool,
  pub system_changed: bool,
  /// Reached through package → app propagation
  pub via_dependency: bool,
  /// Files inside the workspace changed
  pub directly_changed: bool,
}

impl TriggerReason {
  pub fn decide(facts: TriggerFacts) -> Self {
    if facts.force_full {
      TriggerReason::TriggeredFromForceFullCi
    } else if facts.system_changed {
      TriggerReason::TriggeredFromSystemFilesChange
    } else if facts.via_dependency {
      TriggerReason::TriggeredFromDependencyChange
    } else if facts.directly_changed {
      TriggerReason::DetectedChange
    } else {
      TriggerReason::NoChangeDetected
    }
  }

  /// Every reason except `NoChangeDetected` is a `Run` state
  pub fn should_run(self) -> bool {
    self != TriggerReason::NoChangeDetected
  }

  pub fn label(self) -> &'static str {
    match self {
      TriggerReason::NoChangeDetected => "No Change Detected",
      TriggerReason::DetectedChange => "Detected Change",
      TriggerReason::TriggeredFromDependencyChange => "Triggered From Dependency Change",
      TriggerReason::TriggeredFromSystemFilesChange => "Triggered From System Files Change",
      TriggerReason::TriggeredFromForceFullCi => "Triggered From Force Full CI",
    }
  }
}

impl fmt::Display for TriggerReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
