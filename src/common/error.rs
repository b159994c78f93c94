//! Error types for the PetFriends client
//!
//! Remote validation failures (400, 403, ...) are not errors here: every
//! client call returns the status and body as-is. These variants cover
//! local failures, transport problems and scenario assertions.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PetFriends client
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Response Errors ===
    #[error("Malformed response (status {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    // === Authentication Errors ===
    #[error("Authentication failed with status {status}. Check the configured email and password")]
    AuthenticationFailed { status: u16 },

    #[error("No credentials configured. Set PETFRIENDS_EMAIL and PETFRIENDS_PASSWORD or add a [credentials] section to the config file")]
    MissingCredentials,

    // === Precondition Errors ===
    #[error("There are no own pets, even after creating one")]
    NoOwnPets,

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),
}

impl Error {
    /// Create a malformed response error
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            status,
            message: message.into(),
        }
    }

    /// Create a file read error for the given path
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create an assertion error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::TestAssertion(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_actionable() {
        let err = Error::AuthenticationFailed { status: 403 };
        assert!(err.to_string().contains("403"));
        assert!(Error::MissingCredentials.to_string().contains("PETFRIENDS_EMAIL"));
    }

    #[test]
    fn test_file_read_includes_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = Error::file_read(std::path::Path::new("images/cat1.jpg"), &io_err);
        assert_eq!(
            err.to_string(),
            "Failed to read file 'images/cat1.jpg': gone"
        );
    }
}
