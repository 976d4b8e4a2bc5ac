//! Batch status polling
//!
//! One poll covers every outstanding job with a single status call and turns
//! each returned record into a decision:
//!
//! | Status | Action |
//! |--------|--------|
//! | `success` | Archived; playback URL derived from the timestamp |
//! | `error`, transient code, budget left | Job dropped, URL re-queued for submission |
//! | `error`, transient code, budget spent | Failed: retries exhausted |
//! | `error`, any other code | Failed immediately with an explanation |
//! | `pending` / unknown / omitted | Kept, unless older than the job timeout |
//! | status call fails | Every outstanding job fails |

use crate::client::{CaptureClient, CaptureStatus, ClientError, JobId, StatusRecord};
use crate::config::WorkflowConfig;
use crate::output::{format_archive_url, CaptureRecord};
use crate::state::{AttemptCounter, CaptureState, PendingJob, PendingJobs, TransientRetries};
use crate::url::CaptureUrl;
use crate::workflow::classifier::classify_error;
use crate::workflow::clock::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

/// Outcome of one poll cycle
#[derive(Debug, Default)]
pub struct PollReport {
    /// URLs whose capture succeeded
    pub archived: Vec<CaptureRecord>,

    /// URLs that failed for good
    pub failed: Vec<CaptureRecord>,

    /// URLs that must go back into the submission queue
    pub requeue: Vec<CaptureUrl>,
}

impl PollReport {
    /// Returns true if nothing changed this cycle
    pub fn is_empty(&self) -> bool {
        self.archived.is_empty() && self.failed.is_empty() && self.requeue.is_empty()
    }
}

/// Performs batch status checks over the pending job table
#[derive(Debug, Clone)]
pub struct Poller {
    job_timeout: Duration,
    courtesy_delay: Duration,
    max_transient_retries: u32,
    playback_prefix: String,
}

impl Poller {
    pub fn new(workflow: &WorkflowConfig, playback_prefix: impl Into<String>) -> Self {
        Self {
            job_timeout: workflow.job_timeout(),
            courtesy_delay: workflow.poll_courtesy_delay(),
            max_transient_retries: workflow.max_transient_retries,
            playback_prefix: playback_prefix.into(),
        }
    }

    /// Polls every pending job once and applies the results
    ///
    /// Resolved jobs are removed from `pending`. The courtesy delay is taken
    /// after the status call whatever its outcome.
    pub async fn poll(
        &self,
        client: &dyn CaptureClient,
        clock: &dyn Clock,
        pending: &mut PendingJobs,
        transient: &mut TransientRetries,
    ) -> PollReport {
        let job_ids = pending.job_ids();
        if job_ids.is_empty() {
            return PollReport::default();
        }

        let report = match client.poll_batch(&job_ids).await {
            Ok(records) => self.apply_records(records, clock.now(), pending, transient),
            Err(e) => self.fail_all(&e, pending, transient),
        };

        if !self.courtesy_delay.is_zero() {
            clock.sleep(self.courtesy_delay).await;
        }

        report
    }

    /// Applies the records of one successful status call
    pub fn apply_records(
        &self,
        records: Vec<StatusRecord>,
        now: DateTime<Utc>,
        pending: &mut PendingJobs,
        transient: &mut TransientRetries,
    ) -> PollReport {
        let mut report = PollReport::default();
        let mut seen: HashSet<JobId> = HashSet::new();

        for record in records {
            let Some(job) = pending.get(&record.job_id).cloned() else {
                tracing::debug!("Ignoring status for unknown job {}", record.job_id);
                continue;
            };
            seen.insert(job.job_id.clone());

            match record.status {
                CaptureStatus::Success => {
                    pending.remove(&job.job_id);
                    report.archived.push(self.archived(job, record, transient));
                }
                CaptureStatus::Error => {
                    pending.remove(&job.job_id);
                    self.handle_error(job, record, transient, &mut report);
                }
                CaptureStatus::Pending | CaptureStatus::Unknown => {
                    tracing::debug!("Job {} ({}) is pending...", job.job_id, job.url);
                    self.check_timeout(&job, now, pending, transient, &mut report);
                }
            }
        }

        // Jobs the service left out of its answer count as still pending
        for job_id in pending.job_ids() {
            if seen.contains(&job_id) {
                continue;
            }
            if let Some(job) = pending.get(&job_id).cloned() {
                tracing::debug!("No status returned for job {} ({})", job.job_id, job.url);
                self.check_timeout(&job, now, pending, transient, &mut report);
            }
        }

        report
    }

    fn archived(
        &self,
        job: PendingJob,
        record: StatusRecord,
        transient: &mut TransientRetries,
    ) -> CaptureRecord {
        let archive_url = record
            .timestamp
            .as_deref()
            .map(|ts| format_archive_url(&self.playback_prefix, ts, job.url.as_str()));

        match &archive_url {
            Some(archive_url) => tracing::info!("Success for job {}: {}", job.job_id, archive_url),
            None => tracing::info!(
                "Success for job {} ({}), no capture timestamp reported",
                job.job_id,
                job.url
            ),
        }

        let retries = transient.get(&job.url);
        transient.clear(&job.url);

        let mut out = CaptureRecord::new(job.url, CaptureState::Archived)
            .with_job_id(job.job_id)
            .with_transient_retries(retries);
        out.archive_url = archive_url;
        out.timestamp = record.timestamp;
        out
    }

    fn handle_error(
        &self,
        job: PendingJob,
        record: StatusRecord,
        transient: &mut TransientRetries,
        report: &mut PollReport,
    ) {
        let code = record.status_ext.clone();
        let classification = classify_error(code.as_deref());
        let code_label = code.as_deref().unwrap_or("no detail code");

        if let Some(message) = &record.message {
            tracing::debug!("Service message for job {}: {}", job.job_id, message);
        }

        if !classification.is_transient() {
            tracing::error!(
                "Error for job {} ({}): {} [{}]",
                job.job_id,
                job.url,
                classification.explanation,
                code_label
            );
            let retries = transient.get(&job.url);
            transient.clear(&job.url);
            report.failed.push(
                CaptureRecord::new(job.url, CaptureState::RemoteError)
                    .with_job_id(job.job_id)
                    .with_detail_code(code)
                    .with_reason(classification.explanation)
                    .with_transient_retries(retries),
            );
            return;
        }

        let count = transient.increment(&job.url);
        if AttemptCounter::exceeds(count, self.max_transient_retries) {
            tracing::error!(
                "Job {} ({}) hit a transient error: {} [{}]; retry budget of {} exhausted",
                job.job_id,
                job.url,
                classification.explanation,
                code_label,
                self.max_transient_retries
            );
            transient.clear(&job.url);
            report.failed.push(
                CaptureRecord::new(job.url, CaptureState::RetriesExhausted)
                    .with_job_id(job.job_id)
                    .with_detail_code(code)
                    .with_reason(format!(
                        "{} Gave up after {} retries.",
                        classification.explanation, self.max_transient_retries
                    ))
                    .with_transient_retries(count),
            );
        } else {
            tracing::warn!(
                "Transient error for job {} ({}): {} [{}]. Re-queuing (retry {}/{}).",
                job.job_id,
                job.url,
                classification.explanation,
                code_label,
                count,
                self.max_transient_retries
            );
            report.requeue.push(job.url);
        }
    }

    fn check_timeout(
        &self,
        job: &PendingJob,
        now: DateTime<Utc>,
        pending: &mut PendingJobs,
        transient: &mut TransientRetries,
        report: &mut PollReport,
    ) {
        if !job.has_timed_out(now, self.job_timeout) {
            return;
        }

        tracing::error!(
            "Job {} ({}) timed out after {}s pending",
            job.job_id,
            job.url,
            self.job_timeout.as_secs()
        );
        pending.remove(&job.job_id);
        let retries = transient.get(&job.url);
        transient.clear(&job.url);
        report.failed.push(
            CaptureRecord::new(job.url.clone(), CaptureState::TimedOut)
                .with_job_id(job.job_id.clone())
                .with_reason("timed out")
                .with_transient_retries(retries),
        );
    }

    /// The status call itself failed: every outstanding job fails
    fn fail_all(
        &self,
        error: &ClientError,
        pending: &mut PendingJobs,
        transient: &mut TransientRetries,
    ) -> PollReport {
        let jobs = pending.drain();
        tracing::error!(
            "Status check for {} jobs failed: {}. Marking them all as failed.",
            jobs.len(),
            error
        );

        let failed = jobs
            .into_iter()
            .map(|job| {
                let retries = transient.get(&job.url);
                transient.clear(&job.url);
                CaptureRecord::new(job.url, CaptureState::PollFailed)
                    .with_job_id(job.job_id)
                    .with_reason(format!("status check failed: {}", error))
                    .with_transient_retries(retries)
            })
            .collect();

        PollReport {
            failed,
            ..PollReport::default()
        }
    }
}
