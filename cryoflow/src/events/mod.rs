//! Progress reporting.
//!
//! The workflow reports each step through a [`ProgressSink`]. The text sink
//! renders the line protocol a GUI host parses (`progress: N/TOTAL`); other
//! sinks log or collect events.

mod event;
mod progress;
mod sink;

pub use event::{ProgressEvent, StageTiming};
pub use progress::{Progress, PROGRESS_REGEX};
pub use sink::{CollectingSink, FanoutSink, LoggingSink, NoOpSink, ProgressSink, TextSink};
