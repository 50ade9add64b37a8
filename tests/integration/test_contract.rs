//! Integration tests for `affected-ci contract`

use crate::helpers::{MonorepoFixture, shared_runtime_fixture, stderr, stdout};
use anyhow::Result;
use serde_json::json;

#[test]
fn test_conforming_monorepo_passes() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let out = repo.run_ok(&["contract"])?;
  assert!(out.contains("Workspace contract check passed."));
  Ok(())
}

#[test]
fn test_mismatched_ci_tasks_fail() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_script("apps/backend/package.json", "ci", "pnpm run lint && pnpm run test")?;
  repo.set_script("apps/backend/package.json", "test", "echo ok")?;

  let output = repo.run(&["contract"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("Workspace contract check failed:"));
  assert!(err.contains("- app backend ciTasks must match scripts.ci in order and contents"));

  Ok(())
}

#[test]
fn test_all_violations_reported_in_one_pass() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_script("apps/backend/package.json", "ci", "pnpm run lint && eslint .")?;
  repo.write_json(
    "packages/bare/package.json",
    &json!({ "name": "@pkg/bare", "scripts": {} }),
  )?;

  let output = repo.run(&["contract"])?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(1));
  assert!(err.contains("app backend has a ci script that is not a plain \"pnpm run <task>\" chain"));
  assert!(err.contains(
    "package bare is missing script: ci (set workspaceStatus: \"inactive\" to skip)"
  ));

  Ok(())
}

#[test]
fn test_inactive_workspace_without_scripts_passes() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.write_json(
    "apps/legacy/package.json",
    &json!({ "name": "@app/legacy", "workspaceStatus": "inactive" }),
  )?;

  let out = repo.run_ok(&["contract"])?;
  assert!(out.contains("Workspace contract check passed."));

  Ok(())
}

#[test]
fn test_cycle_reported_in_json() -> Result<()> {
  let repo = MonorepoFixture::new()?;
  repo.add_package("a", &["b"])?;
  repo.add_package("b", &["c"])?;
  repo.add_package("c", &["a"])?;

  let output = repo.run(&["contract", "--json"])?;
  assert_eq!(output.status.code(), Some(1));

  let report: serde_json::Value = serde_json::from_str(stdout(&output).trim())?;
  assert_eq!(report["passed"], json!(false));
  assert_eq!(report["cycles"], json!([["@pkg/a", "@pkg/b", "@pkg/c", "@pkg/a"]]));
  assert_eq!(
    report["violations"],
    json!(["workspace dependency cycle detected: @pkg/a -> @pkg/b -> @pkg/c -> @pkg/a"])
  );

  Ok(())
}

#[test]
fn test_infra_app_needs_only_ci() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.write_json(
    "apps/infra/package.json",
    &json!({
      "name": "@app/infra",
      "scripts": { "ci": "pnpm run deploy:check", "deploy:check": "echo ok" },
      "ciTasks": ["deploy:check"],
    }),
  )?;

  let out = repo.run_ok(&["contract"])?;
  assert!(out.contains("Workspace contract check passed."));

  Ok(())
}

#[test]
fn test_non_array_ci_tasks_is_a_violation_not_a_crash() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_field("apps/backend/package.json", "ciTasks", json!("lint"))?;
  repo.set_field("packages/shared-runtime/package.json", "dependencies", json!(null))?;

  let output = repo.run(&["contract"])?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(1));
  assert!(err.contains("Workspace contract check failed:"));
  assert!(err.contains("- app backend is missing ciTasks (required to mirror scripts.ci)"));
  assert!(!err.contains("Failed to parse manifest"));

  Ok(())
}
