//! Change source: which files does this run consider changed?
//!
//! - **staged**: local pre-commit, only files queued in the index
//! - **pr**: pull-request CI, `origin/<base-ref>...<head-sha>`
//! - **range**: push CI, `<base-sha>...<head-sha>`; an all-zeros base (brand new
//!   ref) or a missing base/head means every tracked file counts as changed
//!
//! The run parameters arrive as an explicit [`ChangeSourceConfig`]; nothing in
//! here reads the process environment.

use crate::core::error::{ConfigError, GateError, GateResult};
use crate::core::vcs::SystemGit;
use crate::utils::to_git_path;
use std::collections::HashSet;
use std::fmt;

/// How changed files are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
  Staged,
  Pr,
  Range,
}

impl ChangeMode {
  pub fn parse(s: &str) -> GateResult<Self> {
    match s.trim().to_lowercase().as_str() {
      "" | "staged" => Ok(Self::Staged),
      "pr" => Ok(Self::Pr),
      "range" => Ok(Self::Range),
      other => Err(GateError::Config(ConfigError::UnknownMode {
        value: other.to_string(),
      })),
    }
  }
}

impl fmt::Display for ChangeMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangeMode::Staged => write!(f, "staged"),
      ChangeMode::Pr => write!(f, "pr"),
      ChangeMode::Range => write!(f, "range"),
    }
  }
}

/// Mode plus the revision selectors it needs
#[derive(Debug, Clone)]
pub struct ChangeSourceConfig {
  pub mode: ChangeMode,
  pub base_ref: Option<String>,
  pub base_sha: Option<String>,
  pub head_sha: Option<String>,
}

/// The version-control queries a change source needs
pub trait ChangeBackend {
  fn staged_files(&self) -> GateResult<Vec<String>>;
  fn diff_names(&self, base: &str, head: &str) -> GateResult<Vec<String>>;
  fn tracked_files(&self) -> GateResult<Vec<String>>;
}

impl ChangeBackend for SystemGit {
  fn staged_files(&self) -> GateResult<Vec<String>> {
    SystemGit::staged_files(self)
  }

  fn diff_names(&self, base: &str, head: &str) -> GateResult<Vec<String>> {
    SystemGit::diff_names(self, base, head)
  }

  fn tracked_files(&self) -> GateResult<Vec<String>> {
    SystemGit::tracked_files(self)
  }
}

/// Produces the changed-file list for one run
pub struct ChangeSource<B: ChangeBackend> {
  backend: B,
  config: ChangeSourceConfig,
}

impl<B: ChangeBackend> ChangeSource<B> {
  pub fn new(backend: B, config: ChangeSourceConfig) -> Self {
    Self { backend, config }
  }

  /// Changed files: deduplicated, trimmed, blank-filtered, forward-slash normalized
  pub fn list_changed(&self) -> GateResult<Vec<String>> {
    let raw = match self.config.mode {
      ChangeMode::Staged => self.backend.staged_files()?,
      ChangeMode::Pr => {
        let base_ref = require(&self.config.base_ref, ChangeMode::Pr, "BASE_REF")?;
        let head = require(&self.config.head_sha, ChangeMode::Pr, "HEAD_SHA")?;
        let base = if base_ref.starts_with("origin/") {
          base_ref.to_string()
        } else {
          format!("origin/{}", base_ref)
        };
        self.backend.diff_names(&base, head)?
      }
      ChangeMode::Range => match (present(&self.config.base_sha), present(&self.config.head_sha)) {
        (Some(base), Some(head)) if !is_zero_sha(base) => self.backend.diff_names(base, head)?,
        _ => {
          tracing::info!("range base or head missing (or base is all zeros), treating every tracked file as changed");
          self.backend.tracked_files()?
        }
      },
    };

    let files = normalize(raw);
    tracing::debug!("{} changed file(s) in {} mode", files.len(), self.config.mode);
    Ok(files)
  }
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require<'a>(value: &'a Option<String>, mode: ChangeMode, parameter: &str) -> GateResult<&'a str> {
  present(value).ok_or_else(|| {
    GateError::Config(ConfigError::MissingParameter {
      mode: mode.to_string(),
      parameter: parameter.to_string(),
    })
  })
}

/// The sentinel git uses for "no previous revision" (SHA-1 or SHA-256 width)
pub fn is_zero_sha(sha: &str) -> bool {
  (sha.len() == 40 || sha.len() == 64) && sha.bytes().all(|b| b == b'0')
}

fn normalize(raw: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  raw
    .iter()
    .map(|line| to_git_path(line))
    .filter(|path| !path.is_empty())
    .filter(|path| seen.insert(path.clone()))
    .collect()
}
