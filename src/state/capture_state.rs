/// Capture outcome definitions
///
/// This module defines every terminal outcome a URL can reach once it leaves
/// the workflow.
use std::fmt;

/// Final outcome of one URL in the capture workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaptureState {
    // ===== Success =====
    /// The service reported the capture as archived
    Archived,

    // ===== Failures =====
    /// Submission kept failing until the submission budget ran out
    SubmissionFailed,

    /// The service reported a permanent error for the job
    RemoteError,

    /// The service kept reporting transient errors until the retry budget ran out
    RetriesExhausted,

    /// The job stayed pending longer than the job timeout
    TimedOut,

    /// The batch status call itself failed while the job was outstanding
    PollFailed,
}

impl CaptureState {
    /// Returns true if this represents a successful capture
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Returns true if this represents a failure of any kind
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Short machine-friendly name, used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archived => "archived",
            Self::SubmissionFailed => "submission_failed",
            Self::RemoteError => "remote_error",
            Self::RetriesExhausted => "retries_exhausted",
            Self::TimedOut => "timed_out",
            Self::PollFailed => "poll_failed",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Archived => "Archived",
            Self::SubmissionFailed => "Submission failed",
            Self::RemoteError => "Remote error",
            Self::RetriesExhausted => "Retries exhausted",
            Self::TimedOut => "Timed out",
            Self::PollFailed => "Status check failed",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
