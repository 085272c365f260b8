//! Status tracking for asynchronous bulk jobs.
//!
//! Bulk mutation endpoints don't apply changes inline; they enqueue a job
//! and hand back its id. [`JobOperations::wait_for_job`] polls that id until
//! the job reaches a terminal state, and the helpers on [`JobStatus`] sort
//! the per-item results into successes and failures.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{Instant, sleep};

use crate::core::Zendesk;
use crate::error::{Result, ZendeskError};
use crate::traits::JobOperations;

/// Lifecycle states reported by the job status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Working,
    Completed,
    Failed,
}

impl JobState {
    /// Whether the job can still change state. `Failed` is terminal but is
    /// returned to the caller as a value, not raised as an error.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub job_status: JobStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub progress: Option<u64>,
    pub status: JobState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<JobResult>>,
}

/// Per-item outcome record inside a terminal job.
///
/// The endpoint family behind this shape is not consistent: some jobs
/// report an explicit `success` flag per item, others only carry the
/// created resource id or an error string. Every field is therefore
/// optional and [`JobResult::outcome`] pins down the interpretation.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Classified outcome of one job item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
    /// The item carried neither a success flag, a resource id, nor an
    /// error message
    Indeterminate,
}

impl JobResult {
    /// Classifies the item. An explicit `success` flag wins; without one,
    /// a resource id means success and an error message means failure.
    pub fn outcome(&self) -> JobOutcome {
        match self.success {
            Some(true) => JobOutcome::Succeeded,
            Some(false) => JobOutcome::Failed,
            None => {
                if self.id.is_some() {
                    JobOutcome::Succeeded
                } else if self.errors.is_some() {
                    JobOutcome::Failed
                } else {
                    JobOutcome::Indeterminate
                }
            }
        }
    }
}

impl JobStatus {
    /// Ids of the resources whose items succeeded, in result order.
    pub fn successful_ids(&self) -> Vec<u64> {
        self.results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|result| result.outcome() == JobOutcome::Succeeded)
            .filter_map(|result| result.id)
            .collect()
    }

    /// Items that failed, in result order.
    pub fn failed_results(&self) -> Vec<&JobResult> {
        self.results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|result| result.outcome() == JobOutcome::Failed)
            .collect()
    }
}

/// Polling cadence for [`JobOperations::wait_for_job`]
#[derive(Debug, Clone, Copy)]
pub struct JobPollOptions {
    /// Delay between status checks
    pub interval: Duration,
    /// Overall deadline for reaching a terminal state
    pub timeout: Duration,
}

impl Default for JobPollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

impl JobPollOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

#[async_trait]
impl JobOperations for Zendesk {
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        self.get(&format!("/job_statuses/{}.json", job_id), None)
            .await
    }

    /// Polls the job on a fixed interval until it reaches a terminal state.
    ///
    /// A `Failed` job is a normal return value; only poll errors and the
    /// deadline raise. Any error during a status check propagates
    /// immediately.
    async fn wait_for_job(
        &self,
        job_id: &str,
        options: JobPollOptions,
    ) -> Result<JobStatusResponse> {
        let started = Instant::now();

        while started.elapsed() < options.timeout {
            let response = self.job_status(job_id).await?;
            if response.job_status.status.is_terminal() {
                return Ok(response);
            }
            sleep(options.interval).await;
        }

        Err(ZendeskError::JobTimeout {
            job_id: job_id.to_string(),
            timeout_ms: options.timeout.as_millis() as u64,
        })
    }
}
