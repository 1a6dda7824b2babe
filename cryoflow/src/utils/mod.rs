//! Utility functions for run ids and timestamp handling.

pub mod timestamps;

pub use timestamps::{file_stamp, format_clock, format_elapsed, now_local, Timestamp};

use uuid::Uuid;

/// Generates an id for one workflow run, used to correlate log lines.
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}
