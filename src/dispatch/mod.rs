//! Task dispatch: trigger reasons, planning and the CI orchestrator
//!
//! - **reason**: per-workspace trigger state machine
//! - **plan**: group selection and per-workspace actions (no side effects)
//! - **orchestrator**: sequential, fail-fast execution of a plan

pub mod orchestrator;
pub mod plan;
pub mod reason;

pub use orchestrator::Dispatcher;
pub use plan::CiOptions;
