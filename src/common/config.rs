//! Configuration file handling
//!
//! Settings come from `config.toml` in the platform config directory and
//! may be overridden by `PETFRIENDS_*` environment variables.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Environment variable overriding the service base URL
pub const ENV_BASE_URL: &str = "PETFRIENDS_BASE_URL";
/// Environment variable overriding the account email
pub const ENV_EMAIL: &str = "PETFRIENDS_EMAIL";
/// Environment variable overriding the account password
pub const ENV_PASSWORD: &str = "PETFRIENDS_PASSWORD";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Account credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Remote service settings
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    /// Base URL all API routes are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://petfriends.skillfactory.ru/".to_string()
}

/// Account credentials as written in the config file
#[derive(Deserialize, Default)]
pub struct CredentialsConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Default)]
pub struct Timeouts {
    /// Per-request timeout; requests wait indefinitely when unset
    pub request_secs: Option<u64>,
}

impl Timeouts {
    /// Request timeout as a duration
    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist. Environment
    /// overrides are applied in both cases.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a config file without consulting the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.service.base_url = url;
        }
        if let Some(email) = lookup(ENV_EMAIL).filter(|v| !v.is_empty()) {
            self.credentials.email = Some(email);
        }
        if let Some(password) = lookup(ENV_PASSWORD).filter(|v| !v.is_empty()) {
            self.credentials.password = Some(password);
        }
    }

    /// Get the configured credentials
    pub fn credentials(&self) -> Result<crate::api::Credentials> {
        match (&self.credentials.email, &self.credentials.password) {
            (Some(email), Some(password)) => {
                Ok(crate::api::Credentials::new(email.clone(), password.clone()))
            }
            _ => Err(Error::MissingCredentials),
        }
    }
}
