//! Scenario test runner
//!
//! Reads YAML test scenarios and executes them against the PetFriends
//! service through the typed client, so assertions are made against
//! structured status codes and JSON bodies.

mod config;
mod runner;

pub use config::*;
pub use runner::{print_summary, run_loaded, run_scenario, run_suite, TestResult};
