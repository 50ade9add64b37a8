//! Integration tests for affected-ci
//!
//! Every test builds a throwaway git monorepo and drives the compiled binary.

mod helpers;
mod test_affected;
mod test_ci;
mod test_contract;
mod test_run;
