//! In-memory output handler
//!
//! Keeps every outcome record of a run so a summary or report can be
//! produced once the workflow has finished.

use crate::output::traits::{CaptureRecord, OutputHandler, OutputResult, RunSummary};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CollectorInner {
    records: Vec<CaptureRecord>,
    total_urls: u64,
    finished_at: Option<DateTime<Utc>>,
}

/// Output handler that collects outcome records in memory
#[derive(Debug)]
pub struct ReportCollector {
    started_at: DateTime<Utc>,
    inner: Mutex<CollectorInner>,
}

impl ReportCollector {
    /// Creates a collector for a run starting now
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Creates a collector for a run that started at `started_at`
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            inner: Mutex::new(CollectorInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectorInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the records received so far
    pub fn records(&self) -> Vec<CaptureRecord> {
        self.lock().records.clone()
    }

    /// Builds a summary from the records received so far
    pub fn summary(&self) -> RunSummary {
        let inner = self.lock();
        let mut summary = RunSummary::new();

        summary.started_at = self.started_at.to_rfc3339();
        if let Some(finished) = inner.finished_at {
            summary.finished_at = Some(finished.to_rfc3339());
            summary.duration_seconds = finished
                .signed_duration_since(self.started_at)
                .to_std()
                .ok()
                .map(|d| d.as_secs());
        }

        summary.total_urls = inner.total_urls.max(inner.records.len() as u64);

        for record in &inner.records {
            *summary.by_state.entry(record.state).or_insert(0) += 1;

            if record.state.is_success() {
                summary.archived += 1;
                summary.archived_urls.push((
                    record.url.to_string(),
                    record.archive_url.clone().unwrap_or_default(),
                ));
            } else {
                summary.failed += 1;
                summary.failures.push((
                    record.url.to_string(),
                    record.state,
                    record.reason.clone().unwrap_or_default(),
                ));
            }
        }

        summary
    }
}

impl Default for ReportCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputHandler for ReportCollector {
    fn record_outcome(&self, record: &CaptureRecord) -> OutputResult<()> {
        self.lock().records.push(record.clone());
        Ok(())
    }

    fn finalize(&self, total_urls: u64) -> OutputResult<()> {
        let mut inner = self.lock();
        inner.total_urls = total_urls;
        inner.finished_at = Some(Utc::now());
        Ok(())
    }
}
