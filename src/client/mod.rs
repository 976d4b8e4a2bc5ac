//! Capture client module
//!
//! The workflow engine only ever talks to the archive service through the
//! [`CaptureClient`] trait: submit one capture, query the status of a batch of
//! jobs. [`Spn2Client`] is the production implementation over HTTP.

mod spn2;

pub use spn2::{build_http_client, Spn2Client};

use crate::url::CaptureUrl;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by a capture client
///
/// The engine never propagates these; it turns each one into a retry or a
/// failure for the URLs involved.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Service handle for a capture in progress
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Status of a job as reported by one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Pending,
    Success,
    Error,
    /// Any status string the service adds later; handled like `Pending`
    #[serde(other)]
    Unknown,
}

/// Snapshot of one job returned by a batch status call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusRecord {
    pub job_id: JobId,
    pub status: CaptureStatus,

    /// Detail code on error, e.g. `error:not-found`
    #[serde(default)]
    pub status_ext: Option<String>,

    /// Capture timestamp (`YYYYMMDDhhmmss`) on success
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl StatusRecord {
    /// Builds a `pending` record
    pub fn pending(job_id: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(job_id),
            status: CaptureStatus::Pending,
            status_ext: None,
            timestamp: None,
            message: None,
        }
    }

    /// Builds a `success` record carrying the capture timestamp
    pub fn success(job_id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            status: CaptureStatus::Success,
            timestamp: Some(timestamp.into()),
            ..Self::pending(job_id)
        }
    }

    /// Builds an `error` record carrying a detail code
    pub fn error(job_id: impl Into<String>, status_ext: impl Into<String>) -> Self {
        Self {
            status: CaptureStatus::Error,
            status_ext: Some(status_ext.into()),
            ..Self::pending(job_id)
        }
    }
}

/// A capture-behavior parameter value; the service accepts strings and integers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptureParamValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for CaptureParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for CaptureParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for CaptureParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CaptureParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Optional capture parameters forwarded verbatim on every submission
pub type CaptureParams = BTreeMap<String, CaptureParamValue>;

/// Abstraction over the remote capture service
#[async_trait]
pub trait CaptureClient: Send + Sync {
    /// Submits one capture request
    ///
    /// # Returns
    ///
    /// * `Ok(Some(JobId))` - The service accepted the capture
    /// * `Ok(None)` - The service answered without a job id (usually throttling)
    /// * `Err(ClientError)` - Transport failure or non-success response
    async fn submit(
        &self,
        url: &CaptureUrl,
        params: &CaptureParams,
    ) -> Result<Option<JobId>, ClientError>;

    /// Queries the status of every job in `job_ids` with one round trip
    ///
    /// `job_ids` is never empty.
    async fn poll_batch(&self, job_ids: &[JobId]) -> Result<Vec<StatusRecord>, ClientError>;
}
