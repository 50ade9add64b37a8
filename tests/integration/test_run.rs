//! Integration tests for `affected-ci run <task>`

use crate::helpers::shared_runtime_fixture;
use anyhow::Result;

#[test]
fn test_no_affected_apps_skips() -> Result<()> {
  let repo = shared_runtime_fixture()?;

  let out = repo.run_ok(&["run", "lint"])?;
  assert!(out.contains("No affected apps detected. Skipping."));
  assert!(repo.ran().is_empty());

  Ok(())
}

#[test]
fn test_runs_task_for_each_affected_app() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.stage("packages/shared-runtime/src/index.ts", "export const pkg = 2;\n")?;

  let out = repo.run_ok(&["run", "lint"])?;

  assert!(out.contains("▶ lint for apps/backend"));
  assert!(out.contains("▶ lint for apps/frontend"));
  // packages are not part of the run command
  assert_eq!(repo.ran(), vec!["backend:lint", "frontend:lint"]);

  Ok(())
}

#[test]
fn test_type_check_skips_apps_without_typescript() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.add_app("widgets", &[])?;
  std::fs::remove_file(repo.path.join("apps/widgets/src/index.ts"))?;
  repo.write("apps/widgets/src/index.js", "module.exports = 1;\n")?;
  repo.commit("Add plain JS app")?;

  repo.stage("apps/widgets/src/index.js", "module.exports = 2;\n")?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;

  let out = repo.run_ok(&["run", "type-check"])?;

  assert!(out.contains("▶ type-check for apps/widgets (skipped: no TS files)"));
  assert!(out.contains("▶ type-check for apps/backend"));
  assert_eq!(repo.ran(), vec!["backend:type-check"]);

  Ok(())
}

#[test]
fn test_failing_task_propagates_exit_code() -> Result<()> {
  let repo = shared_runtime_fixture()?;
  repo.set_script("apps/backend/package.json", "dev", "exit 4")?;
  repo.commit("Break backend dev")?;
  repo.stage("apps/backend/src/index.ts", "export const app = 2;\n")?;

  let output = repo.run(&["run", "dev"])?;
  assert_eq!(output.status.code(), Some(4));

  Ok(())
}
