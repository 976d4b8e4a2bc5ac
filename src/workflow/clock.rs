//! Time source and sleeper used by the workflow
//!
//! Every suspension point of the workflow (rate-limit pause, courtesy pause
//! after a poll, idle backoff) goes through a [`Clock`], so runs can be
//! replayed instantly with [`ManualClock`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Source of "now" plus a way to wait
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock time and real tokio sleeps
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug)]
struct ManualClockInner {
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
}

/// Simulated clock: sleeping returns at once and moves time forward
///
/// Each requested sleep is recorded, which lets tests assert the exact
/// sequence of waits a run performed.
#[derive(Debug)]
pub struct ManualClock {
    inner: Mutex<ManualClockInner>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(ManualClockInner {
                now,
                sleeps: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualClockInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Moves time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut inner = self.lock();
        inner.now = shift(inner.now, duration);
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Sum of every sleep requested so far
    pub fn total_slept(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        let mut inner = self.lock();
        inner.now = shift(inner.now, duration);
        inner.sleeps.push(duration);
    }
}

/// Adds `duration` to `now`; an unrepresentable result leaves `now` unchanged
fn shift(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}
