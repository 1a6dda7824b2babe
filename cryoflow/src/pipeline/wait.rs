//! Polling a job until it reaches a status.

use crate::errors::{CryoflowError, Result};
use crate::remote::{ComputeService, JobHandle, JobStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// How to poll job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Delay between status checks.
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl WaitOptions {
    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Polls `job` until it reports `target`.
///
/// There is no timeout. A terminal status other than `target` is an error.
pub async fn wait_for_status<S>(
    service: &S,
    job: &JobHandle,
    target: JobStatus,
    options: WaitOptions,
) -> Result<JobStatus>
where
    S: ComputeService + ?Sized,
{
    loop {
        let status = service.job_status(job).await?;
        if status == target {
            return Ok(status);
        }
        if status.is_terminal() {
            return Err(CryoflowError::JobFailed {
                job_uid: job.uid.clone(),
                job_type: job.job_type.clone(),
                status,
                expected: target,
            });
        }

        debug!(job = %job.uid, status = %status, target = %target, "Waiting for job");
        tokio::time::sleep(options.poll_interval).await;
    }
}

/// Polls `job` until it completes.
pub async fn wait_for_done<S>(service: &S, job: &JobHandle, options: WaitOptions) -> Result<JobStatus>
where
    S: ComputeService + ?Sized,
{
    wait_for_status(service, job, JobStatus::Completed, options).await
}
