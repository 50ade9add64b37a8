//! package.json manifest (only the fields affected-ci reads)

use crate::core::error::{GateResult, ManifestError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Value of `workspaceStatus` that opts a workspace out of CI
pub const INACTIVE: &str = "inactive";

/// package.json structure (minimal fields we care about)
///
/// Dependency versions are never interpreted, so they stay as raw JSON values.
/// Fields of the wrong JSON type read as absent; whether that breaks the
/// workspace contract is for the contract checks to report, not the parser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  #[serde(default, deserialize_with = "lenient_string")]
  pub name: Option<String>,

  /// task name → command; only used for existence checks (and by the script runner)
  #[serde(default, deserialize_with = "lenient_scripts")]
  pub scripts: BTreeMap<String, String>,

  #[serde(default, deserialize_with = "lenient_map")]
  pub dependencies: BTreeMap<String, Value>,

  #[serde(default, deserialize_with = "lenient_map")]
  pub optional_dependencies: BTreeMap<String, Value>,

  #[serde(default, deserialize_with = "lenient_map")]
  pub peer_dependencies: BTreeMap<String, Value>,

  /// Ordered CI pipeline this workspace commits to; anything but an array is `None`
  #[serde(default, deserialize_with = "lenient_task_list")]
  pub ci_tasks: Option<Vec<String>>,

  #[serde(default, deserialize_with = "lenient_string")]
  pub workspace_status: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) => Some(s),
    _ => None,
  })
}

fn lenient_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    Value::Object(map) => map.into_iter().collect(),
    _ => BTreeMap::new(),
  })
}

fn lenient_scripts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error> {
  Ok(
    lenient_map(deserializer)?
      .into_iter()
      .filter_map(|(task, cmd)| match cmd {
        Value::String(cmd) => Some((task, cmd)),
        _ => None,
      })
      .collect(),
  )
}

fn lenient_task_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    // non-string entries keep their JSON text so the mirror check still flags them
    Value::Array(items) => Some(
      items
        .into_iter()
        .map(|item| match item {
          Value::String(task) => task,
          other => other.to_string(),
        })
        .collect(),
    ),
    _ => None,
  })
}

impl Manifest {
  /// Read and parse a manifest file
  pub fn load(path: &Path) -> GateResult<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        ManifestError::Missing {
          path: path.to_path_buf(),
        }
      } else {
        ManifestError::Unparsable {
          path: path.to_path_buf(),
          reason: e.to_string(),
        }
      }
    })?;

    Self::parse(&content, path)
  }

  /// Parse manifest text; `path` is only used for error messages
  pub fn parse(content: &str, path: &Path) -> GateResult<Self> {
    serde_json::from_str(content).map_err(|e| {
      ManifestError::Unparsable {
        path: path.to_path_buf(),
        reason: e.to_string(),
      }
      .into()
    })
  }

  /// `workspaceStatus: "inactive"`
  pub fn is_inactive(&self) -> bool {
    self.workspace_status.as_deref() == Some(INACTIVE)
  }

  /// Names from dependencies ∪ optionalDependencies ∪ peerDependencies
  pub fn dependency_names(&self) -> BTreeSet<&str> {
    self
      .dependencies
      .keys()
      .chain(self.optional_dependencies.keys())
      .chain(self.peer_dependencies.keys())
      .map(String::as_str)
      .collect()
  }

  pub fn has_script(&self, name: &str) -> bool {
    self.scripts.get(name).is_some_and(|cmd| !cmd.trim().is_empty())
  }
}
