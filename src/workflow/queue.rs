//! Submission queue
//!
//! This module holds the URLs that still need a job on the service:
//! - FIFO order for fresh URLs
//! - Retried URLs go to the back, so they cycle behind fresh ones
//! - A per-URL count of failed submission attempts

use crate::state::SubmissionAttempts;
use crate::url::CaptureUrl;
use std::collections::{HashSet, VecDeque};

/// Ordered list of not-yet-submitted URLs plus their attempt counters
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    /// URLs waiting for submission, front is next
    queue: VecDeque<CaptureUrl>,

    /// Failed submission attempts per URL
    attempts: SubmissionAttempts,
}

impl SubmissionQueue {
    /// Creates a queue from the initial URLs
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new(urls: impl IntoIterator<Item = CaptureUrl>) -> Self {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        for url in urls {
            if seen.insert(url.clone()) {
                queue.push_back(url);
            } else {
                tracing::debug!("Ignoring duplicate URL {}", url);
            }
        }

        Self {
            queue,
            attempts: SubmissionAttempts::new(),
        }
    }

    /// Pops the next URL from the front
    pub fn take_next(&mut self) -> Option<CaptureUrl> {
        self.queue.pop_front()
    }

    /// Appends a URL to the back
    pub fn requeue(&mut self, url: CaptureUrl) {
        self.queue.push_back(url);
    }

    /// Counts a submission attempt for `url` and returns the attempt number
    pub fn record_attempt(&mut self, url: &CaptureUrl) -> u32 {
        self.attempts.increment(url)
    }

    /// Forgets the attempts of `url` after a successful submission
    pub fn clear_attempts(&mut self, url: &CaptureUrl) {
        self.attempts.clear(url);
    }

    /// Attempts recorded for `url` so far
    pub fn attempts(&self, url: &CaptureUrl) -> u32 {
        self.attempts.get(url)
    }

    pub fn contains(&self, url: &CaptureUrl) -> bool {
        self.queue.contains(url)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
