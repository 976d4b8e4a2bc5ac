use crate::url::CaptureUrl;
use std::collections::HashMap;

/// Per-URL counter of failed attempts
///
/// Used twice by the workflow: once for failed submissions and once for
/// transient errors reported while polling. The two budgets are independent.
#[derive(Debug, Default, Clone)]
pub struct AttemptCounter {
    counts: HashMap<CaptureUrl, u32>,
}

/// Failed submission attempts per URL
pub type SubmissionAttempts = AttemptCounter;

/// Transient polling errors per URL
pub type TransientRetries = AttemptCounter;

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `url` and returns the new value
    pub fn increment(&mut self, url: &CaptureUrl) -> u32 {
        let count = self.counts.entry(url.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count for `url`, zero if absent
    pub fn get(&self, url: &CaptureUrl) -> u32 {
        self.counts.get(url).copied().unwrap_or(0)
    }

    /// Forgets `url`
    pub fn clear(&mut self, url: &CaptureUrl) {
        self.counts.remove(url);
    }

    /// Returns true if `count` is beyond a budget of `max` retries
    pub fn exceeds(count: u32, max: u32) -> bool {
        count > max
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
