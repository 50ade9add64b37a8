//! Core building blocks shared by every command
//!
//! - **config**: affected.toml parsing and defaults
//! - **context**: workspace context built once per run
//! - **error**: error taxonomy with exit codes and help text
//! - **vcs**: git subprocess backend (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
