//! Workspace inventory: apps and packages found under the two roots
//!
//! A directory under a root is a workspace iff it is a directory AND contains a
//! parseable `package.json`. The inventory is built once at run start and is the
//! only source of truth for which workspaces exist.

pub mod manifest;

pub use manifest::Manifest;

use crate::core::config::GateConfig;
use crate::core::error::{GateResult, ResultExt};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
  App,
  Package,
}

impl fmt::Display for WorkspaceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WorkspaceKind::App => write!(f, "app"),
      WorkspaceKind::Package => write!(f, "package"),
    }
  }
}

/// One app or package
#[derive(Debug, Clone)]
pub struct Workspace {
  pub kind: WorkspaceKind,
  /// Directory name under its root; the workspace's name everywhere in output
  pub name: String,
  /// Directory relative to the monorepo root, forward slashes (`apps/web`)
  pub dir: String,
  pub manifest: Manifest,
}

impl Workspace {
  pub fn new(kind: WorkspaceKind, root_dir: &str, name: impl Into<String>, manifest: Manifest) -> Self {
    let name = name.into();
    Self {
      kind,
      dir: format!("{}/{}", root_dir, name),
      name,
      manifest,
    }
  }

  /// `name` field from package.json
  pub fn declared_name(&self) -> Option<&str> {
    self.manifest.name.as_deref()
  }

  pub fn is_active(&self) -> bool {
    !self.manifest.is_inactive()
  }

  /// Declared CI pipeline, if any
  pub fn ci_tasks(&self) -> Option<&[String]> {
    self.manifest.ci_tasks.as_deref()
  }
}

/// All workspaces of both kinds, each list sorted by directory name
#[derive(Debug, Clone, Default)]
pub struct Inventory {
  apps: Vec<Workspace>,
  packages: Vec<Workspace>,
}

impl Inventory {
  /// Scan both roots under `root`
  pub fn scan(root: &Path, config: &GateConfig) -> GateResult<Self> {
    let apps = list_workspaces(root, &config.apps_root, WorkspaceKind::App)?;
    let packages = list_workspaces(root, &config.packages_root, WorkspaceKind::Package)?;

    tracing::debug!("inventory: {} app(s), {} package(s)", apps.len(), packages.len());
    Ok(Self::from_workspaces(apps, packages))
  }

  /// Build from already-loaded workspaces (kinds are taken from the list they arrive in)
  pub fn from_workspaces(mut apps: Vec<Workspace>, mut packages: Vec<Workspace>) -> Self {
    apps.sort_by(|a, b| a.name.cmp(&b.name));
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Self { apps, packages }
  }

  pub fn apps(&self) -> &[Workspace] {
    &self.apps
  }

  pub fn packages(&self) -> &[Workspace] {
    &self.packages
  }

  pub fn of_kind(&self, kind: WorkspaceKind) -> &[Workspace] {
    match kind {
      WorkspaceKind::App => &self.apps,
      WorkspaceKind::Package => &self.packages,
    }
  }

  /// Apps first, then packages
  pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
    self.apps.iter().chain(self.packages.iter())
  }

  pub fn get(&self, kind: WorkspaceKind, name: &str) -> Option<&Workspace> {
    self.of_kind(kind).iter().find(|ws| ws.name == name)
  }

  pub fn names(&self, kind: WorkspaceKind) -> Vec<String> {
    self.of_kind(kind).iter().map(|ws| ws.name.clone()).collect()
  }
}

/// Enumerate the workspaces directly under `root/<kind_root>`
pub fn list_workspaces(root: &Path, kind_root: &str, kind: WorkspaceKind) -> GateResult<Vec<Workspace>> {
  let base: PathBuf = root.join(kind_root);
  if !base.is_dir() {
    return Ok(Vec::new());
  }

  let mut workspaces = Vec::new();
  let entries = std::fs::read_dir(&base).with_context(|| format!("Failed to list {}", base.display()))?;

  for entry in entries {
    let entry = entry.with_context(|| format!("Failed to list {}", base.display()))?;
    let path = entry.path();
    if !path.is_dir() {
      continue;
    }

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
      tracing::debug!("{} has no {}, not a workspace", path.display(), MANIFEST_FILE);
      continue;
    }

    let Some(name) = entry.file_name().to_str().map(String::from) else {
      tracing::warn!("skipping non UTF-8 workspace directory {}", path.display());
      continue;
    };

    let manifest = Manifest::load(&manifest_path)?;
    workspaces.push(Workspace::new(kind, kind_root, name, manifest));
  }

  workspaces.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(workspaces)
}
