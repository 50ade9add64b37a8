//! `affected-ci project-files` - Changed files that belong to the project itself
//!
//! Anything outside the two workspace roots, `docs/` and `node_modules/`,
//! printed as a JSON array for project-scoped formatters.

use crate::changes::ChangeSourceConfig;
use crate::core::config::GateConfig;
use crate::core::context::WorkspaceContext;
use crate::core::error::GateResult;
use crate::utils::path_matches;

const EXCLUDED_DIRS: [&str; 2] = ["docs/", "node_modules/"];

/// Run the project-files command
pub fn run_project_files(ctx: &WorkspaceContext, changes: &ChangeSourceConfig) -> GateResult<()> {
  let files = ctx.changed_files(changes)?;
  let project = project_level_files(&files, &ctx.config);
  println!("{}", serde_json::to_string(&project)?);
  Ok(())
}

pub fn project_level_files<'a>(files: &'a [String], config: &GateConfig) -> Vec<&'a str> {
  let apps = format!("{}/", config.apps_root);
  let packages = format!("{}/", config.packages_root);

  files
    .iter()
    .map(String::as_str)
    .filter(|file| {
      !path_matches(file, &apps)
        && !path_matches(file, &packages)
        && !EXCLUDED_DIRS.iter().any(|dir| path_matches(file, dir))
    })
    .collect()
}
