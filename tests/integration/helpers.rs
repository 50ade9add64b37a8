//! Test helpers for integration tests

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// File every fixture task appends `<workspace>:<task>` to
pub const RUN_LOG: &str = "ran.log";

/// A pnpm-style monorepo in a temporary git repository
///
/// Tasks run in script mode, so each one is a plain `sh -c` command that
/// appends a line to `ran.log` at the root.
pub struct MonorepoFixture {
  _root: TempDir,
  pub path: PathBuf,
}

impl MonorepoFixture {
  /// Root manifest, affected.toml and an initial commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;

    let fixture = Self { _root: root, path };

    let mut scripts = serde_json::Map::new();
    for task in ["format:check", "lint", "type-check", "test"] {
      scripts.insert(task.to_string(), json!(format!("echo project:{} >> {}", task, RUN_LOG)));
    }
    fixture.write_json(
      "package.json",
      &json!({ "name": "fixture-monorepo", "private": true, "scripts": scripts }),
    )?;
    fixture.write("affected.toml", "[runner]\nkind = \"script\"\n")?;
    fixture.write("docs/guide.md", "# Guide\n")?;
    fixture.write(".gitignore", &format!("{}\n", RUN_LOG))?;
    fixture.commit("Initial monorepo setup")?;

    Ok(fixture)
  }

  /// App with the full script contract; `ciTasks` mirrors `scripts.ci`
  pub fn add_app(&self, name: &str, packages: &[&str]) -> Result<()> {
    let manifest = workspace_manifest(&format!("@app/{}", name), name, packages, &["lint", "build"], true);
    self.write_json(&format!("apps/{}/package.json", name), &manifest)?;
    self.write(&format!("apps/{}/src/index.ts", name), "export const app = 1;\n")
  }

  /// Package with the package contract; `ciTasks` mirrors `scripts.ci`
  pub fn add_package(&self, name: &str, packages: &[&str]) -> Result<()> {
    let manifest = workspace_manifest(&format!("@pkg/{}", name), name, packages, &["lint", "test"], false);
    self.write_json(&format!("packages/{}/package.json", name), &manifest)?;
    self.write(&format!("packages/{}/src/index.ts", name), "export const pkg = 1;\n")
  }

  /// Replace one script of a workspace manifest
  pub fn set_script(&self, manifest: &str, task: &str, command: &str) -> Result<()> {
    let mut value = self.read_json(manifest)?;
    value["scripts"][task] = json!(command);
    self.write_json(manifest, &value)
  }

  /// Set (or overwrite) a top-level field of a manifest
  pub fn set_field(&self, manifest: &str, field: &str, value: Value) -> Result<()> {
    let mut current = self.read_json(manifest)?;
    current[field] = value;
    self.write_json(manifest, &current)
  }

  pub fn write(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file, content).with_context(|| format!("Failed to write {}", file.display()))
  }

  pub fn write_json(&self, rel: &str, value: &Value) -> Result<()> {
    self.write(rel, &format!("{}\n", serde_json::to_string_pretty(value)?))
  }

  pub fn read_json(&self, rel: &str) -> Result<Value> {
    let content = std::fs::read_to_string(self.path.join(rel))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Write a file and add it to the index
  pub fn stage(&self, rel: &str, content: &str) -> Result<()> {
    self.write(rel, content)?;
    git(&self.path, &["add", rel])?;
    Ok(())
  }

  /// Commit everything, returning the new HEAD sha
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Lines appended to `ran.log` by the tasks that ran
  pub fn ran(&self) -> Vec<String> {
    std::fs::read_to_string(self.path.join(RUN_LOG))
      .map(|log| log.lines().map(|l| l.trim().to_string()).collect())
      .unwrap_or_default()
  }

  /// Run the binary with a clean CI environment
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    self.run_with_env(args, &[])
  }

  pub fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_affected-ci"));
    cmd.current_dir(&self.path).args(args);
    for var in ["CI", "AFFECTED_MODE", "BASE_REF", "BASE_SHA", "HEAD_SHA", "RUST_LOG"] {
      cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    for (key, value) in envs {
      cmd.env(key, value);
    }
    cmd.output().context("Failed to run affected-ci")
  }

  /// Run and require success; returns stdout
  pub fn run_ok(&self, args: &[&str]) -> Result<String> {
    let output = self.run(args)?;
    if !output.status.success() {
      anyhow::bail!(
        "affected-ci {} failed\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
      );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }

  /// `affected` JSON payload
  pub fn affected(&self, args: &[&str]) -> Result<Value> {
    let mut full = vec!["affected"];
    full.extend_from_slice(args);
    let stdout = self.run_ok(&full)?;
    serde_json::from_str(stdout.trim()).context("affected output is not JSON")
  }
}

/// The backend / frontend / shared-runtime monorepo used across tests
pub fn shared_runtime_fixture() -> Result<MonorepoFixture> {
  let fixture = MonorepoFixture::new()?;
  fixture.add_package("shared-runtime", &[])?;
  fixture.add_app("backend", &["shared-runtime"])?;
  fixture.add_app("frontend", &["shared-runtime"])?;
  fixture.commit("Add workspaces")?;
  Ok(fixture)
}

fn workspace_manifest(declared: &str, dir: &str, packages: &[&str], ci_tasks: &[&str], app: bool) -> Value {
  // tasks run inside <root>/<kind>/<dir>
  let log = format!("../../{}", RUN_LOG);
  let mut scripts = serde_json::Map::new();
  let chain: Vec<String> = ci_tasks.iter().map(|t| format!("pnpm run {}", t)).collect();
  scripts.insert("ci".to_string(), json!(chain.join(" && ")));

  let mut tasks: Vec<&str> = ci_tasks.to_vec();
  if app {
    tasks.extend(["build", "dev", "type-check"]);
  }
  for task in tasks {
    scripts.insert(task.to_string(), json!(format!("echo {}:{} >> {}", dir, task, log)));
  }

  let dependencies: serde_json::Map<String, Value> = packages
    .iter()
    .map(|p| (format!("@pkg/{}", p), json!("workspace:*")))
    .collect();

  json!({
    "name": declared,
    "private": true,
    "scripts": scripts,
    "dependencies": dependencies,
    "ciTasks": ci_tasks,
  })
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
