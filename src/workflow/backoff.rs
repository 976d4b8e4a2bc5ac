//! Idle-poll backoff
//!
//! When the submission queue is empty but jobs are still pending, the driver
//! waits between poll cycles. The wait grows geometrically and is capped; any
//! successful submission puts it back to the initial value.

use crate::config::BackoffConfig;
use std::time::Duration;

/// Computes the wait before the next idle poll cycle
///
/// The k-th consecutive idle wait (counting from zero) is
/// `min(initial * factor^k, max)`.
#[derive(Debug, Clone)]
pub struct IdleBackoff {
    initial_secs: f64,
    factor: f64,
    max_secs: f64,
    idle_cycles: u32,
}

impl IdleBackoff {
    pub fn new(config: &BackoffConfig) -> Self {
        Self {
            initial_secs: config.initial_wait_secs,
            factor: config.factor,
            max_secs: config.max_wait_secs,
            idle_cycles: 0,
        }
    }

    /// The wait the next idle cycle would use, without advancing
    pub fn current(&self) -> Duration {
        let exponent = i32::try_from(self.idle_cycles).unwrap_or(i32::MAX);
        let secs = (self.initial_secs * self.factor.powi(exponent)).min(self.max_secs);
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Returns the wait for this idle cycle and grows it for the next one
    pub fn next_wait(&mut self) -> Duration {
        let wait = self.current();
        self.idle_cycles = self.idle_cycles.saturating_add(1);
        wait
    }

    /// Back to the initial wait; called after every successful submission
    pub fn reset(&mut self) {
        self.idle_cycles = 0;
    }

    pub fn idle_cycles(&self) -> u32 {
        self.idle_cycles
    }
}
