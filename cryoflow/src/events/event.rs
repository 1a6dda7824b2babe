//! Events emitted while the workflow runs.

use super::Progress;
use crate::utils::{format_clock, format_elapsed, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock timing of one completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Step name.
    pub stage: String,
    /// When the step started.
    pub started_at: Timestamp,
    /// When the step finished.
    pub finished_at: Timestamp,
    /// Measured duration.
    pub elapsed: Duration,
}

/// An observable moment in a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A step began.
    StageStarted {
        /// Step name.
        stage: String,
        /// Start time.
        at: Timestamp,
    },
    /// A step completed.
    StageFinished(StageTiming),
    /// The progress counter moved.
    Advanced(Progress),
}

impl ProgressEvent {
    /// The event type name used in logs.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StageStarted { .. } => "stage.started",
            Self::StageFinished(_) => "stage.completed",
            Self::Advanced(_) => "progress.advanced",
        }
    }

    /// Renders the event as the text lines a GUI host reads from stdout.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::StageStarted { stage, at } => vec![
                String::new(),
                format!("Start Job: *** {stage} *** at {}", format_clock(at)),
            ],
            Self::StageFinished(timing) => vec![
                format!(
                    "End Job: *** {} *** at {}",
                    timing.stage,
                    format_clock(&timing.finished_at)
                ),
                format!(
                    "Total time taken for {}: {}",
                    timing.stage,
                    format_elapsed(timing.elapsed)
                ),
                String::new(),
            ],
            Self::Advanced(progress) => vec![progress.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Local.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_started_lines() {
        let event = ProgressEvent::StageStarted {
            stage: "ctf_estimation".to_string(),
            at: at(9, 0, 0),
        };
        assert_eq!(
            event.lines(),
            vec!["", "Start Job: *** ctf_estimation *** at 2024-03-01 09:00:00"]
        );
    }

    #[test]
    fn test_finished_lines() {
        let event = ProgressEvent::StageFinished(StageTiming {
            stage: "twoD_classify".to_string(),
            started_at: at(9, 0, 0),
            finished_at: at(9, 12, 30),
            elapsed: Duration::from_secs(750),
        });
        assert_eq!(
            event.lines(),
            vec![
                "End Job: *** twoD_classify *** at 2024-03-01 09:12:30",
                "Total time taken for twoD_classify: 0:12:30",
                "",
            ]
        );
    }

    #[test]
    fn test_advanced_line() {
        let event = ProgressEvent::Advanced(Progress { current: 4, total: 9 });
        assert_eq!(event.lines(), vec!["progress: 4/9"]);
        assert_eq!(event.event_type(), "progress.advanced");
    }
}
