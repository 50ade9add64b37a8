//! `affected-ci affected` - Show which apps and packages a change affects
//!
//! The JSON form is the programmatic contract: one compact line with
//! `apps`, `packages`, `systemChanges`, `changedSystems`, `packageImpacts`,
//! `changedFiles`, `allApps`, `allPackages`, `changedApps`, `changedPackages`.

use crate::changes::ChangeSourceConfig;
use crate::core::context::WorkspaceContext;
use crate::core::error::GateResult;
use crate::graph::AffectedResult;

/// Output format for the affected command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
  /// Compact JSON payload
  Json,
  /// Human-readable summary
  Text,
  /// Effective app list, one per line
  Names,
}

/// Run the affected command
pub fn run_affected(ctx: &WorkspaceContext, changes: &ChangeSourceConfig, format: OutputFormat) -> GateResult<()> {
  let result = ctx.detect(changes)?;

  match format {
    OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
    OutputFormat::Names => {
      for app in &result.apps {
        println!("{}", app);
      }
    }
    OutputFormat::Text => {
      display_text(&result, changes);
      display_dependents(ctx);
    }
  }

  Ok(())
}

/// One-hop reverse dependents the result was computed with
fn display_dependents(ctx: &WorkspaceContext) {
  let reverse = ctx.graph.reverse_dependents();
  println!();
  println!(
    "Workspace graph: {} node(s), {} package(s) with dependent apps",
    ctx.graph.node_count(),
    reverse.len()
  );
  for (package, apps) in reverse {
    let apps: Vec<&str> = apps.iter().map(String::as_str).collect();
    println!("  {} ← {}", package, apps.join(", "));
  }
}

fn display_text(result: &AffectedResult, changes: &ChangeSourceConfig) {
  println!("Affected Analysis ({} mode)", changes.mode);
  println!("=================");
  println!();

  println!("Changed files: {}", result.changed_files.len());
  for file in result.changed_files.iter().take(20) {
    println!("  {}", file);
  }
  if result.changed_files.len() > 20 {
    println!("  ... and {} more", result.changed_files.len() - 20);
  }
  println!();

  if result.system_changes {
    println!("⚠️  Shared tooling changed: every workspace is affected");
    println!();
  }

  println!("Apps: {}", result.apps.len());
  let dependency_apps = result.dependency_apps();
  for app in &result.apps {
    let marker = if result.system_changes {
      "system"
    } else if dependency_apps.contains(app.as_str()) {
      "dependency"
    } else {
      "changed"
    };
    println!("  📦 {} ({})", app, marker);
  }
  println!();

  println!("Packages: {}", result.packages.len());
  for package in &result.packages {
    println!("  📦 {}", package);
  }

  if !result.package_impacts.is_empty() {
    println!();
    println!("Package impacts:");
    for impact in &result.package_impacts {
      if impact.apps.is_empty() {
        println!("  {} → no dependent apps", impact.package);
      } else {
        println!("  {} → {}", impact.package, impact.apps.join(", "));
      }
    }
  }

  if result.is_empty() {
    println!();
    println!("✅ No workspaces affected");
  }
}
