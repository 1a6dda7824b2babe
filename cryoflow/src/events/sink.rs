//! Progress sink trait and implementations.

use super::ProgressEvent;
use parking_lot::{Mutex, RwLock};
use std::io::{self, Write};
use tracing::{debug, info, warn, Level};

/// Trait for sinks that receive workflow progress events.
///
/// Emitting never fails: sinks log and swallow their own errors so that
/// reporting cannot change the outcome of a run.
pub trait ProgressSink: Send + Sync {
    /// Emits an event.
    fn emit(&self, event: &ProgressEvent);
}

/// A no-op sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Writes the plain-text progress contract to a writer, flushing after each
/// event so a GUI host sees lines as soon as they happen.
#[derive(Debug)]
pub struct TextSink<W: Write + Send> {
    out: Mutex<W>,
}

impl TextSink<io::Stdout> {
    /// Creates a sink writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextSink<W> {
    /// Creates a sink over any writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_lines(&self, event: &ProgressEvent) -> io::Result<()> {
        let mut out = self.out.lock();
        for line in event.lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

impl<W: Write + Send> ProgressSink for TextSink<W> {
    fn emit(&self, event: &ProgressEvent) {
        if let Err(e) = self.write_lines(event) {
            warn!(error = %e, event_type = event.event_type(), "Failed to write progress event");
        }
    }
}

/// A sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingSink {
    level: Level,
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingSink {
    /// Creates a logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl ProgressSink for LoggingSink {
    fn emit(&self, event: &ProgressEvent) {
        let event_type = event.event_type();
        if self.level == Level::DEBUG {
            debug!(event_type = %event_type, event = ?event, "Event: {}", event_type);
        } else {
            info!(event_type = %event_type, event = ?event, "Event: {}", event_type);
        }
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ProgressSink>>,
}

impl FanoutSink {
    /// Creates an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl ProgressSink for FanoutSink {
    fn emit(&self, event: &ProgressEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

/// A collecting sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: RwLock<Vec<ProgressEvent>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().clone()
    }

    /// Returns the progress markers emitted so far, as text.
    #[must_use]
    pub fn markers(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Advanced(progress) => Some(progress.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Returns the names of stages that started, in order.
    #[must_use]
    pub fn started_stages(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::StageStarted { stage, .. } => Some(stage.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: &ProgressEvent) {
        self.events.write().push(event.clone());
    }
}
