use crate::core::error::{ConfigError, GateError, GateResult, ResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for affected-ci
/// Searched in order: affected.toml, .affected.toml, .config/affected.toml
///
/// Every field has a default, so a monorepo without any config file gets the
/// conventional `apps/` + `packages/` layout driven through pnpm.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
  #[serde(default = "default_apps_root")]
  pub apps_root: String,

  #[serde(default = "default_packages_root")]
  pub packages_root: String,

  /// Files (exact) or directories (trailing `/`) whose change invalidates every workspace
  #[serde(default = "default_system_paths")]
  pub system_paths: Vec<String>,

  /// Project-level tasks run once per `ci` invocation, before `ci:contract`
  #[serde(default = "default_project_tasks")]
  pub project_tasks: Vec<String>,

  #[serde(default)]
  pub runner: RunnerConfig,

  #[serde(default)]
  pub contract: ContractConfig,
}

/// How tasks are handed to the outside world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunnerKind {
  /// `<program> -C <dir> run <task>`
  PackageManager,
  /// Execute `scripts[task]` from the manifest with `sh -c`
  Script,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
  #[serde(default = "default_runner_kind")]
  pub kind: RunnerKind,

  /// Package manager binary (also the prefix expected in `scripts.ci` chains)
  #[serde(default = "default_program")]
  pub program: String,
}

/// Scripts every active workspace must declare
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
  #[serde(default = "default_app_scripts")]
  pub app_scripts: Vec<String>,

  #[serde(default = "default_package_scripts")]
  pub package_scripts: Vec<String>,

  /// App directory with the reduced infra requirements
  #[serde(default = "default_infra_app")]
  pub infra_app: String,

  #[serde(default = "default_infra_scripts")]
  pub infra_scripts: Vec<String>,
}

fn default_apps_root() -> String {
  "apps".to_string()
}

fn default_packages_root() -> String {
  "packages".to_string()
}

fn default_system_paths() -> Vec<String> {
  [
    "package.json",
    "pnpm-lock.yaml",
    "pnpm-workspace.yaml",
    "tsconfig.json",
    "tsconfig.base.json",
    "eslint.config.js",
    ".prettierrc.json",
    ".prettierignore",
    ".github/workflows/",
    "commitlint.config.cjs",
    "commitlint.config.formatter.mjs",
    "scripts/",
  ]
  .into_iter()
  .map(String::from)
  .collect()
}

fn default_project_tasks() -> Vec<String> {
  ["format:check", "lint", "type-check", "test"]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_runner_kind() -> RunnerKind {
  RunnerKind::PackageManager
}

fn default_program() -> String {
  "pnpm".to_string()
}

fn default_app_scripts() -> Vec<String> {
  vec!["ci".to_string(), "build".to_string(), "dev".to_string()]
}

fn default_package_scripts() -> Vec<String> {
  vec!["ci".to_string()]
}

fn default_infra_app() -> String {
  "infra".to_string()
}

fn default_infra_scripts() -> Vec<String> {
  vec!["ci".to_string()]
}

impl Default for RunnerConfig {
  fn default() -> Self {
    Self {
      kind: default_runner_kind(),
      program: default_program(),
    }
  }
}

impl Default for ContractConfig {
  fn default() -> Self {
    Self {
      app_scripts: default_app_scripts(),
      package_scripts: default_package_scripts(),
      infra_app: default_infra_app(),
      infra_scripts: default_infra_scripts(),
    }
  }
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      apps_root: default_apps_root(),
      packages_root: default_packages_root(),
      system_paths: default_system_paths(),
      project_tasks: default_project_tasks(),
      runner: RunnerConfig::default(),
      contract: ContractConfig::default(),
    }
  }
}

impl GateConfig {
  /// Find config file in search order: affected.toml, .affected.toml, .config/affected.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("affected.toml"),
      path.join(".affected.toml"),
      path.join(".config").join("affected.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> GateResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!("no affected.toml found under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| match e {
      GateError::Config(ConfigError::Invalid { reason }) => GateError::Config(ConfigError::Invalid {
        reason: format!("{}: {}", config_path.display(), reason),
      }),
      other => other,
    })?;

    tracing::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> GateResult<Self> {
    let config: GateConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> GateResult<()> {
    for (key, value) in [("apps_root", &self.apps_root), ("packages_root", &self.packages_root)] {
      if value.is_empty() || value.contains('/') || value.contains('\\') {
        return Err(GateError::Config(ConfigError::Invalid {
          reason: format!("{} must be a single directory name, got '{}'", key, value),
        }));
      }
    }

    if self.apps_root == self.packages_root {
      return Err(GateError::Config(ConfigError::Invalid {
        reason: "apps_root and packages_root must differ".to_string(),
      }));
    }

    if self.runner.program.trim().is_empty() {
      return Err(GateError::Config(ConfigError::Invalid {
        reason: "runner.program must not be empty".to_string(),
      }));
    }

    Ok(())
  }
}
