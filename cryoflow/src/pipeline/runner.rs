//! Timing and progress around each workflow step.

use crate::errors::Result;
use crate::events::{Progress, ProgressEvent, ProgressSink, StageTiming};
use crate::utils::now_local;
use std::future::Future;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// The value a step produced, with its timing and the advanced counter.
#[derive(Debug, Clone)]
pub struct StageRun<T> {
    /// What the step returned.
    pub value: T,
    /// How long it took.
    pub timing: StageTiming,
    /// The progress counter after this step.
    pub progress: Progress,
}

/// Runs one step, reporting its start, end, duration and the new progress
/// count to `sink`.
///
/// If the step fails only the start is reported, the counter is not
/// advanced and the error is returned unchanged.
pub async fn run_stage<T, F, Fut>(
    name: &str,
    progress: Progress,
    sink: &dyn ProgressSink,
    step: F,
) -> Result<StageRun<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started_at = now_local();
    let clock = Instant::now();
    sink.emit(&ProgressEvent::StageStarted {
        stage: name.to_string(),
        at: started_at,
    });

    let value = match step().instrument(info_span!("stage", stage = %name)).await {
        Ok(value) => value,
        Err(e) => {
            warn!(stage = %name, error = %e, "Stage failed");
            return Err(e);
        }
    };

    let timing = StageTiming {
        stage: name.to_string(),
        started_at,
        finished_at: now_local(),
        elapsed: clock.elapsed(),
    };
    sink.emit(&ProgressEvent::StageFinished(timing.clone()));

    let progress = progress.advance();
    sink.emit(&ProgressEvent::Advanced(progress));

    info!(
        stage = %name,
        elapsed_ms = timing.elapsed.as_millis() as u64,
        current = progress.current,
        total = progress.total,
        "Stage completed"
    );

    Ok(StageRun {
        value,
        timing,
        progress,
    })
}
