//! State module for tracking capture progress
//!
//! This module provides the bookkeeping the workflow engine mutates while it
//! runs.
//!
//! # Components
//!
//! - `CaptureState`: Final outcome of a URL (archived, or which way it failed)
//! - `PendingJobs`: Outstanding jobs keyed by job id, with single-use ids
//! - `AttemptCounter`: Per-URL retry counters for submissions and transient errors

mod attempts;
mod capture_state;
mod pending;

// Re-export main types
pub use attempts::{AttemptCounter, SubmissionAttempts, TransientRetries};
pub use capture_state::CaptureState;
pub use pending::{PendingError, PendingJob, PendingJobs};
