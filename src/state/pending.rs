use crate::client::JobId;
use crate::url::CaptureUrl;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

/// A submitted capture whose outcome is not known yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJob {
    pub job_id: JobId,
    pub url: CaptureUrl,
    pub submitted_at: DateTime<Utc>,
}

impl PendingJob {
    /// Returns true if the job has been pending longer than `timeout` at `now`
    pub fn has_timed_out(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now.signed_duration_since(self.submitted_at)
            .to_std()
            .map(|elapsed| elapsed > timeout)
            .unwrap_or(false)
    }
}

/// Refused insertions into the pending table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PendingError {
    #[error("job id {0} is already pending")]
    AlreadyPending(JobId),

    #[error("job id {0} was already used and retired")]
    Retired(JobId),
}

/// Table of outstanding jobs, keyed by job id
///
/// Job ids are single-use: once removed, an id is remembered and refused if
/// the service ever hands it out again.
#[derive(Debug, Default)]
pub struct PendingJobs {
    jobs: HashMap<JobId, PendingJob>,
    retired: HashSet<JobId>,
}

impl PendingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly submitted job
    pub fn insert(
        &mut self,
        job_id: JobId,
        url: CaptureUrl,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), PendingError> {
        if self.retired.contains(&job_id) {
            return Err(PendingError::Retired(job_id));
        }
        if self.jobs.contains_key(&job_id) {
            return Err(PendingError::AlreadyPending(job_id));
        }

        self.jobs.insert(
            job_id.clone(),
            PendingJob {
                job_id,
                url,
                submitted_at,
            },
        );
        Ok(())
    }

    /// Removes a job and retires its id
    pub fn remove(&mut self, job_id: &JobId) -> Option<PendingJob> {
        let job = self.jobs.remove(job_id)?;
        self.retired.insert(job.job_id.clone());
        Some(job)
    }

    /// Removes every job, retiring all ids
    pub fn drain(&mut self) -> Vec<PendingJob> {
        let mut jobs: Vec<PendingJob> = self.jobs.drain().map(|(_, job)| job).collect();
        jobs.sort_by(|a, b| oldest_first(a, b));
        self.retired.extend(jobs.iter().map(|job| job.job_id.clone()));
        jobs
    }

    pub fn get(&self, job_id: &JobId) -> Option<&PendingJob> {
        self.jobs.get(job_id)
    }

    /// Outstanding job ids, oldest submission first
    pub fn job_ids(&self) -> Vec<JobId> {
        let mut jobs: Vec<&PendingJob> = self.jobs.values().collect();
        jobs.sort_by(|a, b| oldest_first(a, b));
        jobs.into_iter().map(|job| job.job_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Orders jobs by submission time, breaking ties by job id
fn oldest_first(a: &PendingJob, b: &PendingJob) -> Ordering {
    a.submitted_at
        .cmp(&b.submitted_at)
        .then_with(|| a.job_id.cmp(&b.job_id))
}
