//! Workflow coordinator - the capture driver loop
//!
//! This module contains the loop that moves every URL to a terminal outcome:
//! - Submitting queued URLs one at a time, behind the rate-limit pause
//! - Polling all outstanding jobs in one batch per cycle
//! - Re-queuing URLs that hit temporary trouble
//! - Backing off while nothing is left to submit
//! - Reporting every outcome to the output handler

use crate::client::{CaptureClient, CaptureParams, JobId};
use crate::config::Config;
use crate::output::{CaptureRecord, OutputHandler};
use crate::state::{AttemptCounter, CaptureState, PendingJobs, TransientRetries};
use crate::url::CaptureUrl;
use crate::workflow::backoff::IdleBackoff;
use crate::workflow::clock::{Clock, SystemClock};
use crate::workflow::poller::Poller;
use crate::workflow::queue::SubmissionQueue;
use crate::workflow::WorkflowResult;
use std::sync::Arc;

/// Everything a run mutates, owned by the driver for the whole run
#[derive(Debug)]
pub struct WorkflowState {
    queue: SubmissionQueue,
    pending: PendingJobs,
    transient_retries: TransientRetries,
    backoff: IdleBackoff,
    total_urls: u64,
    success_count: u64,
    failure_count: u64,
}

impl WorkflowState {
    fn new(urls: Vec<CaptureUrl>, backoff: IdleBackoff) -> Self {
        let queue = SubmissionQueue::new(urls);
        Self {
            total_urls: queue.len() as u64,
            queue,
            pending: PendingJobs::new(),
            transient_retries: TransientRetries::new(),
            backoff,
            success_count: 0,
            failure_count: 0,
        }
    }

    /// Returns true once nothing is queued and nothing is pending
    pub fn is_done(&self) -> bool {
        self.queue.is_empty() && self.pending.is_empty()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn result(&self) -> WorkflowResult {
        WorkflowResult::new(self.total_urls, self.success_count, self.failure_count)
    }

    /// Every URL is queued, pending, or finished; never two of those
    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let finished = self.success_count + self.failure_count;
        let in_flight = (self.queue.len() + self.pending.len()) as u64;
        let overlap = self
            .pending
            .job_ids()
            .iter()
            .filter_map(|id| self.pending.get(id))
            .any(|job| self.queue.contains(&job.url));
        !overlap && finished + in_flight == self.total_urls
    }
}

/// What a submission step did with the URL it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted; the job is now pending
    Submitted(JobId),

    /// Rejected this time; the URL went to the back of the queue
    Requeued { attempt: u32 },

    /// Out of submission attempts; the URL failed without a network call
    Abandoned { attempts: u32 },
}

/// Main capture workflow coordinator
pub struct Coordinator {
    client: Arc<dyn CaptureClient>,
    clock: Arc<dyn Clock>,
    output: Option<Arc<dyn OutputHandler>>,
    config: Config,
    capture_params: CaptureParams,
    poller: Poller,
}

impl Coordinator {
    /// Creates a coordinator using the system clock and no output handler
    ///
    /// # Arguments
    ///
    /// * `client` - The capture service client
    /// * `config` - Workflow, backoff and service settings; its capture
    ///   parameters are forwarded on every submission
    pub fn new(client: Arc<dyn CaptureClient>, config: &Config) -> Self {
        Self {
            client,
            clock: Arc::new(SystemClock),
            output: None,
            config: config.clone(),
            capture_params: config.capture_params.clone(),
            poller: Poller::new(&config.workflow, config.service.playback_prefix.clone()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_output(mut self, output: Arc<dyn OutputHandler>) -> Self {
        self.output = Some(output);
        self
    }

    /// Replaces the capture parameters taken from the config
    pub fn with_capture_params(mut self, params: CaptureParams) -> Self {
        self.capture_params = params;
        self
    }

    /// Builds the state for a run over `urls`
    pub fn initial_state(&self, urls: Vec<CaptureUrl>) -> WorkflowState {
        WorkflowState::new(urls, IdleBackoff::new(&self.config.backoff))
    }

    /// Runs the workflow until every URL has an outcome
    ///
    /// Never fails: every error along the way ends as a retry or a failed URL.
    ///
    /// # Returns
    ///
    /// Counts of URLs processed, archived and failed
    pub async fn run(&self, urls: Vec<CaptureUrl>) -> WorkflowResult {
        let mut state = self.initial_state(urls);
        let start_time = std::time::Instant::now();

        tracing::info!("Starting capture workflow for {} URLs", state.total_urls);

        while !state.is_done() {
            self.run_cycle(&mut state).await;
        }

        let result = state.result();
        tracing::info!(
            "Workflow completed in {:?}: {} archived, {} failed, {} total",
            start_time.elapsed(),
            result.success_count,
            result.failure_count,
            result.total_urls
        );

        if let Some(output) = &self.output {
            if let Err(e) = output.finalize(result.total_urls) {
                tracing::warn!("Failed to finalize output: {}", e);
            }
        }

        result
    }

    /// One driver iteration: submit, then poll, then back off if idle
    pub async fn run_cycle(&self, state: &mut WorkflowState) {
        if !state.queue.is_empty() {
            self.submit_next(state).await;
        }

        if !state.pending.is_empty() {
            self.poll_pending(state).await;
        }

        if state.queue.is_empty() && !state.pending.is_empty() {
            let wait = state.backoff.next_wait();
            tracing::info!(
                "{} jobs pending, nothing to submit. Waiting {:.1}s before next check...",
                state.pending.len(),
                wait.as_secs_f64()
            );
            if !wait.is_zero() {
                self.clock.sleep(wait).await;
            }
        }
    }

    /// Takes the URL at the head of the queue and tries to submit it
    ///
    /// # Returns
    ///
    /// * `Some(SubmitOutcome)` - What happened to the URL
    /// * `None` - The queue was empty
    pub async fn submit_next(&self, state: &mut WorkflowState) -> Option<SubmitOutcome> {
        let url = state.queue.take_next()?;
        let max_attempts = self.config.workflow.max_submission_retries;
        let attempt = state.queue.record_attempt(&url);

        if AttemptCounter::exceeds(attempt, max_attempts) {
            tracing::error!(
                "URL {} failed submission {} times, giving up.",
                url,
                max_attempts
            );
            state.queue.clear_attempts(&url);
            let retries = state.transient_retries.get(&url);
            state.transient_retries.clear(&url);
            state.failure_count += 1;
            self.emit(
                &CaptureRecord::new(url, CaptureState::SubmissionFailed)
                    .with_reason(format!("submission failed {} times", max_attempts))
                    .with_transient_retries(retries),
            );
            return Some(SubmitOutcome::Abandoned {
                attempts: max_attempts,
            });
        }

        let wait = self.config.workflow.rate_limit_wait();
        if !wait.is_zero() {
            tracing::debug!("Waiting {:?} before submitting {}", wait, url);
            self.clock.sleep(wait).await;
        }

        tracing::info!(
            "Submitting {} (attempt {}/{})...",
            url,
            attempt,
            max_attempts
        );

        let rejection = match self.client.submit(&url, &self.capture_params).await {
            Ok(Some(job_id)) => {
                match state
                    .pending
                    .insert(job_id.clone(), url.clone(), self.clock.now())
                {
                    Ok(()) => {
                        tracing::info!("Submitted {} as job {}", url, job_id);
                        state.queue.clear_attempts(&url);
                        state.backoff.reset();
                        return Some(SubmitOutcome::Submitted(job_id));
                    }
                    Err(e) => format!("service returned an unusable job id: {}", e),
                }
            }
            Ok(None) => "no job id returned".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            "Failed to submit {}: {}. Re-queuing for another attempt.",
            url,
            rejection
        );
        state.queue.requeue(url);
        Some(SubmitOutcome::Requeued { attempt })
    }

    /// Polls every pending job once and books the outcomes
    pub async fn poll_pending(&self, state: &mut WorkflowState) {
        tracing::info!("Checking status of {} pending jobs...", state.pending.len());

        let report = self
            .poller
            .poll(
                self.client.as_ref(),
                self.clock.as_ref(),
                &mut state.pending,
                &mut state.transient_retries,
            )
            .await;

        state.success_count += report.archived.len() as u64;
        state.failure_count += report.failed.len() as u64;

        for record in report.archived.iter().chain(report.failed.iter()) {
            self.emit(record);
        }

        for url in report.requeue {
            state.queue.requeue(url);
        }
    }

    fn emit(&self, record: &CaptureRecord) {
        if let Some(output) = &self.output {
            if let Err(e) = output.record_outcome(record) {
                tracing::warn!("Failed to record outcome for {}: {}", record.url, e);
            }
        }
    }
}

/// Runs the capture workflow over `urls` with the system clock
///
/// # Arguments
///
/// * `client` - The capture service client
/// * `config` - Workflow settings and capture parameters
/// * `urls` - Validated URLs; duplicates are collapsed
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use wayback_archiver::{run_archive_workflow, CaptureUrl, Config, Credentials, Spn2Client};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let client = Spn2Client::new(&config.service, &Credentials::from_env()?)?;
/// let urls = vec![CaptureUrl::parse("https://example.com/")?];
/// let result = run_archive_workflow(Arc::new(client), &config, urls).await;
/// println!("{} of {} archived", result.success_count, result.total_urls);
/// # Ok(())
/// # }
/// ```
pub async fn run_archive_workflow(
    client: Arc<dyn CaptureClient>,
    config: &Config,
    urls: Vec<CaptureUrl>,
) -> WorkflowResult {
    Coordinator::new(client, config).run(urls).await
}
