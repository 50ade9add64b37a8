//! Integration tests for `affected-ci affected` and `affected-ci project-files`

use crate::helpers::{MonorepoFixture, shared_runtime_fixture, stderr};
use anyhow::Result;
use serde_json::json;

#[test]
fn test_package_change_propagates_to_dependent_apps() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let result = repo.affected(&[])?;

  assert_eq!(result["changedPackages"], json!(["shared-runtime"]));
  assert_eq!(result["changedApps"], json!([]));
  assert_eq!(
    result["packageImpacts"],
    json!([{ "package": "shared-runtime", "apps": ["backend", "frontend"] }])
  );
  assert_eq!(result["apps"], json!(["backend", "frontend"]));
  assert_eq!(result["packages"], json!(["shared-runtime"]));
  assert_eq!(result["systemChanges"], json!(false));
  assert_eq!(result["changedSystems"], json!(false));

  Ok(())
}

#[test]
fn test_system_file_invalidates_everything() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;
  repo.stage("pnpm-lock.yaml", "lockfileVersion: '9.0'\n")?;

  let result = repo.affected(&[])?;

  assert_eq!(result["systemChanges"], json!(true));
  assert_eq!(result["apps"], json!(["backend", "frontend"]));
  assert_eq!(result["packages"], json!(["shared-runtime"]));
  assert_eq!(result["packageImpacts"], json!([]));
  assert_eq!(result["changedApps"], json!(["backend"]));

  Ok(())
}

#[test]
fn test_unchanged_repository_is_idempotent() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let first = repo.run_ok(&["affected"])?;
  let second = repo.run_ok(&["affected"])?;
  assert_eq!(first, second);

  let result: serde_json::Value = serde_json::from_str(first.trim())?;
  assert_eq!(result["changedFiles"], json!([]));
  assert_eq!(result["apps"], json!([]));
  assert_eq!(result["systemChanges"], json!(false));
  assert_eq!(result["allApps"], json!(["backend", "frontend"]));

  Ok(())
}

#[test]
fn test_docs_change_is_unattributed() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("docs/guide.md", "# Guide v2\n")?;

  let result = repo.affected(&[])?;
  assert_eq!(result["changedFiles"], json!(["docs/guide.md"]));
  assert_eq!(result["apps"], json!([]));
  assert_eq!(result["packages"], json!([]));
  assert_eq!(result["systemChanges"], json!(false));

  Ok(())
}

#[test]
fn test_range_mode_between_commits() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let base = repo.head()?;
  repo.write("apps/frontend/src/index.ts", "export const app = 3;\n")?;
  let head = repo.commit("Touch frontend")?;

  let result = repo.affected(&["--mode", "range", "--base-sha", &base, "--head-sha", &head])?;
  assert_eq!(result["changedApps"], json!(["frontend"]));
  assert_eq!(result["apps"], json!(["frontend"]));

  Ok(())
}

#[test]
fn test_range_mode_zero_base_lists_every_tracked_file() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let head = repo.head()?;
  let zeros = "0".repeat(40);

  let result = repo.affected(&["--mode", "range", "--base-sha", &zeros, "--head-sha", &head])?;
  let files = result["changedFiles"].as_array().cloned().unwrap_or_default();
  assert!(files.contains(&json!("package.json")));
  assert!(files.contains(&json!("apps/backend/package.json")));
  assert_eq!(result["systemChanges"], json!(true));

  Ok(())
}

#[test]
fn test_mode_parameters_come_from_environment() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let base = repo.head()?;
  repo.write("packages/shared-runtime/src/index.ts", "export const pkg = 5;\n")?;
  let head = repo.commit("Touch shared-runtime")?;

  let output = repo.run_with_env(
    &["affected"],
    &[("AFFECTED_MODE", "range"), ("BASE_SHA", &base), ("HEAD_SHA", &head)],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  let result: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(result["changedPackages"], json!(["shared-runtime"]));

  Ok(())
}

#[test]
fn test_pr_mode_without_base_ref_is_a_config_error() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  let head = repo.head()?;

  let output = repo.run(&["affected", "--mode", "pr", "--head-sha", &head])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(output.stdout.is_empty(), "no partial output expected");
  assert!(stderr(&output).contains("requires BASE_REF"));

  Ok(())
}

#[test]
fn test_unknown_mode_is_rejected() -> Result<()> {
  let repo = MonorepoFixture::new()?;
  let output = repo.run(&["affected", "--mode", "nightly"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Unknown change mode 'nightly'"));
  Ok(())
}

#[test]
fn test_names_format() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let stdout = repo.run_ok(&["affected", "--format", "names"])?;
  assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["backend", "frontend"]);

  Ok(())
}

#[test]
fn test_project_files_excludes_workspaces_and_docs() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("README.md", "# Fixture\n")?;
  repo.stage("docs/guide.md", "# Guide v2\n")?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;

  let stdout = repo.run_ok(&["project-files"])?;
  let files: serde_json::Value = serde_json::from_str(stdout.trim())?;
  assert_eq!(files, json!(["README.md"]));

  Ok(())
}

#[test]
fn test_broken_manifest_aborts() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.write("packages/broken/package.json", "{ not json")?;

  let output = repo.run(&["affected"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Failed to parse manifest"));

  Ok(())
}
