//! Remote job status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a remote job, as reported by the compute service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is being built and has not been queued.
    Building,
    /// Job is waiting for a lane slot.
    Queued,
    /// Job has been handed to a worker.
    Launched,
    /// Worker process has started.
    Started,
    /// Job is running.
    Running,
    /// Interactive job is waiting for user input.
    Waiting,
    /// Job completed successfully.
    Completed,
    /// Job was killed.
    Killed,
    /// Job failed.
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Building
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => write!(f, "building"),
            Self::Queued => write!(f, "queued"),
            Self::Launched => write!(f, "launched"),
            Self::Started => write!(f, "started"),
            Self::Running => write!(f, "running"),
            Self::Waiting => write!(f, "waiting"),
            Self::Completed => write!(f, "completed"),
            Self::Killed => write!(f, "killed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl JobStatus {
    /// Returns true if the job will not change status again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Killed | Self::Failed)
    }

    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Killed | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Queued.to_string(), "queued");
        assert_eq!(JobStatus::Waiting.to_string(), "waiting");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_job_status_is_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Killed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Waiting.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }

    #[test]
    fn test_job_status_serialize() {
        let json = serde_json::to_string(&JobStatus::Launched).unwrap();
        assert_eq!(json, r#""launched""#);

        let deserialized: JobStatus = serde_json::from_str(r#""killed""#).unwrap();
        assert_eq!(deserialized, JobStatus::Killed);
        assert!(deserialized.is_failure());
    }
}
