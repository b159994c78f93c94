//! PetFriends REST API client

mod client;
mod types;

pub use client::PetFriends;
pub use types::{ApiResponse, AuthKey, Credentials, Pet, PetFields, PetFilter};
