//! CLI commands for affected-ci
//!
//! - **affected**: print the change-detection payload
//! - **ci**: run CI for affected workspaces
//! - **contract**: validate workspace manifests
//! - **run**: run one task for every affected app
//! - **project-files**: list changed project-level files
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod affected;
pub mod ci;
pub mod contract;
pub mod project_files;
pub mod run;

pub use affected::{OutputFormat, run_affected};
pub use ci::run_ci;
pub use contract::run_contract;
pub use project_files::run_project_files;
pub use run::run_task;
