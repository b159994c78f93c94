//! PetFriends API client and scenario test runner
//!
//! This library wraps the PetFriends pet-management REST API in a typed
//! async client and runs declarative YAML test scenarios against it.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use api::{ApiResponse, AuthKey, Credentials, Pet, PetFields, PetFilter, PetFriends};
pub use common::{Error, Result};
