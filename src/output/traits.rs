//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! per-URL outcome records the workflow hands to them.

use crate::client::JobId;
use crate::state::CaptureState;
use crate::url::CaptureUrl;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Terminal outcome of one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// The URL that was submitted
    pub url: CaptureUrl,

    /// Final state (always terminal)
    pub state: CaptureState,

    /// Job id of the last submission, if one was accepted
    pub job_id: Option<JobId>,

    /// Playback URL of the capture (archived only)
    pub archive_url: Option<String>,

    /// Capture timestamp reported by the service (archived only)
    pub timestamp: Option<String>,

    /// Remote detail code such as `error:not-found`
    pub detail_code: Option<String>,

    /// Why the URL failed
    pub reason: Option<String>,

    /// Transient polling errors seen for this URL
    pub transient_retries: u32,
}

impl CaptureRecord {
    /// Creates a bare record for `url` in `state`
    pub fn new(url: CaptureUrl, state: CaptureState) -> Self {
        Self {
            url,
            state,
            job_id: None,
            archive_url: None,
            timestamp: None,
            detail_code: None,
            reason: None,
            transient_retries: 0,
        }
    }

    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_detail_code(mut self, code: Option<String>) -> Self {
        self.detail_code = code;
        self
    }

    pub fn with_transient_retries(mut self, retries: u32) -> Self {
        self.transient_retries = retries;
        self
    }
}

/// Summary of one workflow run built from its outcome records
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,

    pub total_urls: u64,
    pub archived: u64,
    pub failed: u64,

    /// Count per terminal state
    pub by_state: BTreeMap<CaptureState, u64>,

    /// Archived URLs with their playback URL
    pub archived_urls: Vec<(String, String)>,

    /// Failed URLs with state and reason
    pub failures: Vec<(String, CaptureState, String)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the success rate as a percentage of finished URLs
    pub fn success_rate(&self) -> f64 {
        let finished = self.archived + self.failed;
        if finished == 0 {
            return 0.0;
        }
        (self.archived as f64 / finished as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// Output handlers receive every terminal per-URL outcome. The workflow
/// logs and ignores their errors, so a broken handler never stops a run.
pub trait OutputHandler: Send + Sync {
    /// Records the terminal outcome of one URL
    fn record_outcome(&self, record: &CaptureRecord) -> OutputResult<()>;

    /// Called once when the run has finished
    fn finalize(&self, total_urls: u64) -> OutputResult<()>;
}
