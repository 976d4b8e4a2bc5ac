//! Configuration module for Wayback Archiver
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus loading the archive.org API credentials.
//!
//! # Example
//!
//! ```no_run
//! use wayback_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Transient retries: {}", config.workflow.max_transient_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BackoffConfig, Config, ServiceConfig, WorkflowConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

use crate::{ConfigError, ConfigResult};
use std::fmt;

/// Environment variable holding the archive.org access key
pub const ACCESS_KEY_VAR: &str = "INTERNET_ARCHIVE_ACCESS_KEY";

/// Environment variable holding the archive.org secret key
pub const SECRET_KEY_VAR: &str = "INTERNET_ARCHIVE_SECRET_KEY";

/// Archive.org S3-style API key pair
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Reads the key pair from the environment
    ///
    /// A `.env` file in the working directory is loaded first; variables that
    /// are already set take precedence over it.
    pub fn from_env() -> ConfigResult<Self> {
        // Absence of a .env file is normal
        let _ = dotenvy::dotenv();

        let access_key = read_var(ACCESS_KEY_VAR)?;
        let secret_key = read_var(SECRET_KEY_VAR)?;
        Ok(Self::new(access_key, secret_key))
    }

    /// Value for the `Authorization` header (`LOW access:secret`)
    pub fn authorization_header(&self) -> String {
        format!("LOW {}:{}", self.access_key, self.secret_key)
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn read_var(name: &'static str) -> ConfigResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingCredentials(name)),
    }
}
