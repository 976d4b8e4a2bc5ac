//! Wayback Archiver: submit pages to the Wayback Machine and see them through
//!
//! This crate drives the Save Page Now (SPN2) capture API: it submits URLs,
//! polls the outstanding jobs in batches, retries what the service reports as
//! temporary trouble and gives up cleanly on everything else.

pub mod client;
pub mod config;
pub mod output;
pub mod state;
pub mod url;
pub mod workflow;

use thiserror::Error;

/// Main error type for Wayback Archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture client error: {0}")]
    Client(#[from] client::ClientError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredentials(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Wayback Archiver operations
pub type Result<T> = std::result::Result<T, ArchiverError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use client::{CaptureClient, CaptureParams, JobId, Spn2Client, StatusRecord};
pub use config::{Config, Credentials};
pub use state::CaptureState;
pub use url::CaptureUrl;
pub use workflow::{run_archive_workflow, Coordinator, WorkflowResult};
