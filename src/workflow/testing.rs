//! Scripted capture client for workflow unit tests

use crate::client::{CaptureClient, CaptureParams, ClientError, JobId, StatusRecord};
use crate::url::CaptureUrl;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// What one submit call for a URL returns
#[derive(Debug, Clone)]
pub enum SubmitScript {
    /// A fresh job id
    Accept,
    /// A job id that was already handed out for this URL
    ReuseLastJobId,
    /// Success response without a job id
    NoJobId,
    /// Transport-level failure
    Fail,
}

/// What one status lookup for a URL's job reports
#[derive(Debug, Clone)]
pub enum PollScript {
    Pending,
    Success(&'static str),
    Error(&'static str),
    /// Job missing from the batch response
    Omit,
}

#[derive(Default)]
struct Inner {
    submit_scripts: HashMap<CaptureUrl, VecDeque<SubmitScript>>,
    poll_scripts: HashMap<CaptureUrl, VecDeque<PollScript>>,
    failing_polls: u32,
    next_job: u32,
    jobs: HashMap<JobId, CaptureUrl>,
    last_job: HashMap<CaptureUrl, JobId>,
    submit_calls: Vec<CaptureUrl>,
    submitted_params: Vec<CaptureParams>,
    poll_calls: Vec<Vec<JobId>>,
}

/// Fake client driven by per-URL scripts
///
/// Each script is consumed front to back; the last entry repeats forever.
/// URLs without a script are accepted and succeed on the first poll.
#[derive(Default)]
pub struct ScriptedClient {
    inner: Mutex<Inner>,
}

fn next_step<T: Clone>(steps: Option<&mut VecDeque<T>>) -> Option<T> {
    let steps = steps?;
    if steps.len() > 1 {
        steps.pop_front()
    } else {
        steps.front().cloned()
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_submit(&self, url: &CaptureUrl, steps: Vec<SubmitScript>) {
        let mut inner = self.inner.lock().unwrap();
        inner.submit_scripts.insert(url.clone(), steps.into());
    }

    pub fn script_poll(&self, url: &CaptureUrl, steps: Vec<PollScript>) {
        let mut inner = self.inner.lock().unwrap();
        inner.poll_scripts.insert(url.clone(), steps.into());
    }

    /// Makes the next `count` batch calls fail
    pub fn fail_next_polls(&self, count: u32) {
        self.inner.lock().unwrap().failing_polls = count;
    }

    /// Hands out a job id for `url` without counting a submit call
    pub fn issue_job_for(&self, url: &CaptureUrl) -> JobId {
        let mut inner = self.inner.lock().unwrap();
        Self::issue(&mut inner, url)
    }

    fn issue(inner: &mut Inner, url: &CaptureUrl) -> JobId {
        inner.next_job += 1;
        let job_id = JobId::new(format!("job-{}", inner.next_job));
        inner.jobs.insert(job_id.clone(), url.clone());
        inner.last_job.insert(url.clone(), job_id.clone());
        job_id
    }

    pub fn submit_calls(&self) -> Vec<CaptureUrl> {
        self.inner.lock().unwrap().submit_calls.clone()
    }

    pub fn submit_count(&self, url: &CaptureUrl) -> usize {
        self.submit_calls().iter().filter(|u| *u == url).count()
    }

    pub fn submitted_params(&self) -> Vec<CaptureParams> {
        self.inner.lock().unwrap().submitted_params.clone()
    }

    pub fn poll_calls(&self) -> Vec<Vec<JobId>> {
        self.inner.lock().unwrap().poll_calls.clone()
    }
}

#[async_trait]
impl CaptureClient for ScriptedClient {
    async fn submit(
        &self,
        url: &CaptureUrl,
        params: &CaptureParams,
    ) -> Result<Option<JobId>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.submit_calls.push(url.clone());
        inner.submitted_params.push(params.clone());

        let step = next_step(inner.submit_scripts.get_mut(url)).unwrap_or(SubmitScript::Accept);
        match step {
            SubmitScript::Accept => Ok(Some(Self::issue(&mut inner, url))),
            SubmitScript::ReuseLastJobId => match inner.last_job.get(url).cloned() {
                Some(job_id) => Ok(Some(job_id)),
                None => Ok(Some(Self::issue(&mut inner, url))),
            },
            SubmitScript::NoJobId => Ok(None),
            SubmitScript::Fail => Err(ClientError::Status {
                status: 503,
                body: "submit refused".to_string(),
            }),
        }
    }

    async fn poll_batch(&self, job_ids: &[JobId]) -> Result<Vec<StatusRecord>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        inner.poll_calls.push(job_ids.to_vec());

        if inner.failing_polls > 0 {
            inner.failing_polls -= 1;
            return Err(ClientError::Decode("status endpoint unreachable".to_string()));
        }

        let mut records = Vec::new();
        for job_id in job_ids {
            let Some(url) = inner.jobs.get(job_id).cloned() else {
                continue;
            };
            let step = next_step(inner.poll_scripts.get_mut(&url))
                .unwrap_or(PollScript::Success("20250115120000"));
            match step {
                PollScript::Pending => records.push(StatusRecord::pending(job_id.as_str())),
                PollScript::Success(ts) => {
                    records.push(StatusRecord::success(job_id.as_str(), ts))
                }
                PollScript::Error(code) => records.push(StatusRecord::error(job_id.as_str(), code)),
                PollScript::Omit => {}
            }
        }
        Ok(records)
    }
}
