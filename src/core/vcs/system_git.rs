//! System git backend
//!
//! Every query is a single `git` subprocess whose stdout is a newline-separated
//! list of paths. Nothing here mutates the repository.

use crate::core::error::{GateError, GateResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  pub fn open(path: &Path) -> GateResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(GateError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(GateError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  /// Working tree root (the monorepo root)
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Files added or modified in the index relative to HEAD
  pub fn staged_files(&self) -> GateResult<Vec<String>> {
    self.name_list(&["diff", "--name-only", "--cached", "--diff-filter=ACMR"])
  }

  /// Files differing between the merge base of `base` and `head`, and `head`
  pub fn diff_names(&self, base: &str, head: &str) -> GateResult<Vec<String>> {
    let range = format!("{}...{}", base, head);
    self.name_list(&["diff", "--name-only", &range])
  }

  /// Every tracked file
  pub fn tracked_files(&self) -> GateResult<Vec<String>> {
    self.name_list(&["ls-files"])
  }

  fn name_list(&self, args: &[&str]) -> GateResult<Vec<String>> {
    tracing::debug!("git {}", args.join(" "));

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GateError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.to_string())
        .collect(),
    )
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Forces unquoted path output
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}
