//! Integration tests for `affected-ci ci`

use crate::helpers::{shared_runtime_fixture, stderr, stdout};
use anyhow::Result;

#[test]
fn test_package_change_runs_dependent_apps_once() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let out = repo.run_ok(&["ci"])?;

  assert!(out.contains("Package shared-runtime - Detected Change"));
  assert!(out.contains("backend - Triggered From Dependency Change"));
  assert!(out.contains("frontend - Triggered From Dependency Change"));
  assert!(out.contains("- shared-runtime → backend, frontend"));
  assert!(out.contains("Full CI check finished."));
  assert_eq!(
    repo.ran(),
    vec![
      "shared-runtime:lint",
      "shared-runtime:test",
      "backend:lint",
      "backend:build",
      "frontend:lint",
      "frontend:build",
    ]
  );

  Ok(())
}

#[test]
fn test_detected_changes_telemetry() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;

  let out = repo.run_ok(&["ci"])?;

  assert!(out.contains("Detected Changes"));
  assert!(out.contains("- System files: no change"));
  assert!(out.contains("- Packages: no change"));
  assert!(out.contains("- Apps: backend"));
  assert!(out.contains("Apps Changed Files"));
  assert!(out.contains("- apps/backend/src/index.ts"));
  assert!(out.contains("backend - Detected Change"));
  assert!(out.contains("frontend - No Change Detected"));
  assert!(out.contains("- Skipping CI"));
  assert!(out.contains("- [x] build"));
  assert_eq!(repo.ran(), vec!["backend:lint", "backend:build"]);

  Ok(())
}

#[test]
fn test_force_full_apps_only() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let out = repo.run_ok(&["ci", "--force-full-ci", "--apps-only"])?;

  assert!(out.contains("backend - Triggered From Force Full CI"));
  assert!(out.contains("frontend - Triggered From Force Full CI"));
  assert!(!out.contains("Package shared-runtime"));
  assert!(!out.contains("Project tasks"));
  assert!(out.contains("Apps only check finished."));
  assert_eq!(
    repo.ran(),
    vec!["backend:lint", "backend:build", "frontend:lint", "frontend:build"]
  );

  Ok(())
}

#[test]
fn test_packages_only_follows_change_detection() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;

  let out = repo.run_ok(&["ci", "--packages-only"])?;

  assert!(out.contains("Package - No Change Detected"));
  assert!(out.contains("Package only check finished."));
  assert!(repo.ran().is_empty());

  Ok(())
}

#[test]
fn test_system_change_runs_project_tasks_and_everything() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("tsconfig.base.json", "{}\n")?;

  let out = repo.run_ok(&["ci"])?;

  assert!(out.contains("- System files: changed"));
  assert!(out.contains("System Changed Files"));
  assert!(!out.contains("Package Impacts"));
  assert!(out.contains("- [x] ci:contract"));
  assert!(out.contains("backend - Triggered From System Files Change"));

  let ran = repo.ran();
  assert_eq!(
    &ran[..4],
    &["project:format:check", "project:lint", "project:type-check", "project:test"]
  );
  assert_eq!(ran.len(), 4 + 2 + 4);

  Ok(())
}

#[test]
fn test_project_only_in_ci_mode() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let output = repo.run_with_env(&["ci", "--project-only"], &[("CI", "true")])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let out = stdout(&output);
  assert!(out.contains("::group::lint"));
  assert!(out.contains("::endgroup::"));
  assert!(out.contains("- [x] ci:contract"));
  assert!(out.contains("Project only check finished."));
  assert_eq!(repo.ran().len(), 4);

  Ok(())
}

#[test]
fn test_ci_env_must_be_exactly_true() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let output = repo.run_with_env(&["ci", "--project-only"], &[("CI", "1")])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(!stdout(&output).contains("::group::"));

  Ok(())
}

#[test]
fn test_no_changes_runs_nothing() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let out = repo.run_ok(&["ci"])?;

  assert!(out.contains("Package - No Change Detected"));
  assert!(out.contains("App - No Change Detected"));
  assert!(out.contains("Full CI check finished."));
  assert!(repo.ran().is_empty());

  Ok(())
}

#[test]
fn test_failing_task_stops_the_run_with_its_exit_code() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_script("apps/backend/package.json", "lint", "echo lint exploded; exit 7")?;
  repo.commit("Break backend lint")?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let output = repo.run(&["ci"])?;
  let out = stdout(&output);

  assert_eq!(output.status.code(), Some(7));
  assert!(out.contains("- [!] lint"));
  assert!(out.contains("CI failed: backend - Triggered From Dependency Change"));
  assert!(!out.contains("Full CI check finished."));
  assert_eq!(repo.ran(), vec!["shared-runtime:lint", "shared-runtime:test"]);

  Ok(())
}

#[test]
fn test_missing_pipeline_is_reported_before_anything_runs() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let mut manifest = repo.read_json("apps/frontend/package.json")?;
  if let Some(object) = manifest.as_object_mut() {
    object.remove("ciTasks");
  }
  repo.write_json("apps/frontend/package.json", &manifest)?;
  repo.commit("Drop frontend ciTasks")?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let output = repo.run(&["ci"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("app frontend has no declared task pipeline (ciTasks)"));
  assert!(repo.ran().is_empty());

  Ok(())
}

#[test]
fn test_inactive_app_is_never_dispatched() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_field("apps/frontend/package.json", "workspaceStatus", serde_json::json!("inactive"))?;
  repo.commit("Retire frontend")?;

  let out = repo.run_ok(&["ci", "--force-full-ci", "--apps-only"])?;

  assert!(out.contains("frontend - Triggered From Force Full CI"));
  assert!(out.contains("- Skipping CI (inactive)"));
  assert_eq!(repo.ran(), vec!["backend:lint", "backend:build"]);

  Ok(())
}
