use crate::client::CaptureParams;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Wayback Archiver
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub backoff: BackoffConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    /// Capture parameters forwarded verbatim on every submission
    #[serde(rename = "capture-params", default)]
    pub capture_params: CaptureParams,
}

/// Submission, retry and timeout policy for the capture workflow
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Pause before each submission (seconds)
    #[serde(rename = "rate-limit-wait-secs")]
    pub rate_limit_wait_secs: u64,

    /// Failed submissions tolerated per URL before it is abandoned
    #[serde(rename = "max-submission-retries")]
    pub max_submission_retries: u32,

    /// Transient remote errors tolerated per URL before it is abandoned
    #[serde(rename = "max-transient-retries")]
    pub max_transient_retries: u32,

    /// How long a job may stay pending before it is failed (seconds)
    #[serde(rename = "job-timeout-secs")]
    pub job_timeout_secs: u64,

    /// Fixed pause after every status call (milliseconds)
    #[serde(rename = "poll-courtesy-delay-ms")]
    pub poll_courtesy_delay_ms: u64,
}

impl WorkflowConfig {
    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_wait_secs)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn poll_courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.poll_courtesy_delay_ms)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            rate_limit_wait_secs: 15,
            max_submission_retries: 3,
            max_transient_retries: 3,
            job_timeout_secs: 2 * 60 * 60,
            poll_courtesy_delay_ms: 200,
        }
    }
}

/// Idle-poll backoff between cycles that submit nothing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    #[serde(rename = "initial-wait-secs")]
    pub initial_wait_secs: f64,

    /// Multiplier applied after every idle cycle
    pub factor: f64,

    #[serde(rename = "max-wait-secs")]
    pub max_wait_secs: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_wait_secs: 5.0,
            factor: 1.5,
            max_wait_secs: 60.0,
        }
    }
}

/// Remote service endpoints and HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    #[serde(rename = "save-endpoint")]
    pub save_endpoint: String,

    #[serde(rename = "status-endpoint")]
    pub status_endpoint: String,

    /// Prefix of archived-page URLs, e.g. `https://web.archive.org/web`
    #[serde(rename = "playback-prefix")]
    pub playback_prefix: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            save_endpoint: "https://web.archive.org/save".to_string(),
            status_endpoint: "https://web.archive.org/save/status".to_string(),
            playback_prefix: "https://web.archive.org/web".to_string(),
            user_agent: format!("wayback-archiver/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}
