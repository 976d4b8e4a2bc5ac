//! Capture workflow engine
//!
//! This module drives URLs through the capture service:
//! - Submission queue with per-URL attempt budgets
//! - Batch polling with error classification and timeouts
//! - Idle backoff while only pending jobs remain
//! - An injectable clock for every wait

mod backoff;
mod classifier;
mod clock;
mod coordinator;
mod poller;
mod queue;

#[cfg(test)]
mod testing;

pub use backoff::IdleBackoff;
pub use classifier::{
    classify_error, explain, Classification, ErrorClass, GENERIC_EXPLANATION,
    TRANSIENT_ERROR_CODES,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{run_archive_workflow, Coordinator, SubmitOutcome, WorkflowState};
pub use poller::{PollReport, Poller};
pub use queue::SubmissionQueue;

/// Final counts of a workflow run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowResult {
    /// Distinct URLs the run was given
    pub total_urls: u64,

    /// URLs archived
    pub success_count: u64,

    /// URLs that ended in any failure state
    pub failure_count: u64,
}

impl WorkflowResult {
    pub fn new(total_urls: u64, success_count: u64, failure_count: u64) -> Self {
        Self {
            total_urls,
            success_count,
            failure_count,
        }
    }

    /// Returns true if every URL reached an outcome
    pub fn is_complete(&self) -> bool {
        self.success_count + self.failure_count == self.total_urls
    }

    /// Archived share of all URLs, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_urls == 0 {
            return 0.0;
        }
        (self.success_count as f64 / self.total_urls as f64) * 100.0
    }
}
