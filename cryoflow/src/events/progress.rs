//! The `progress: N/TOTAL` text contract.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Pattern a GUI host matches against stdout lines to drive its progress bar.
pub const PROGRESS_REGEX: &str = r"^progress: (?P<current>\d+)/(?P<total>\d+)$";

/// How many steps have completed out of how many.
///
/// A plain value: callers thread it through the run and get a new one back
/// from [`Progress::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Completed steps.
    pub current: usize,
    /// Total steps.
    pub total: usize,
}

impl Progress {
    /// Starts a counter at zero.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Returns the counter after one more completed step.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self {
            current: self.current + 1,
            total: self.total,
        }
    }

    /// Returns true once every step has completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current >= self.total
    }

    /// Completion as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.current as f64 / self.total as f64 * 100.0
    }

    /// Parses a `progress: N/TOTAL` line.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn parse(line: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern =
            PATTERN.get_or_init(|| Regex::new(PROGRESS_REGEX).expect("progress pattern compiles"));

        let captures = pattern.captures(line.trim_end_matches(['\r', '\n']))?;
        Some(Self {
            current: captures["current"].parse().ok()?,
            total: captures["total"].parse().ok()?,
        })
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "progress: {}/{}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_by_value() {
        let start = Progress::new(9);
        let next = start.advance().advance();
        assert_eq!(start.current, 0);
        assert_eq!(next.current, 2);
        assert_eq!(next.to_string(), "progress: 2/9");
    }

    #[test]
    fn test_marker_matches_gui_regex() {
        let marker = Progress::new(9).advance().to_string();
        assert_eq!(Progress::parse(&marker), Some(Progress { current: 1, total: 9 }));
    }

    #[test]
    fn test_parse_rejects_other_lines() {
        assert_eq!(Progress::parse("Start Job: *** ctf_estimation ***"), None);
        assert_eq!(Progress::parse(" progress: 1/9"), None);
        assert_eq!(Progress::parse("progress: one/9"), None);
    }

    #[test]
    fn test_pattern_compiles() {
        let pattern = Regex::new(PROGRESS_REGEX).unwrap();
        assert_eq!(pattern.captures_len(), 3);
    }

    #[test]
    fn test_percent() {
        let mut progress = Progress::new(9);
        for _ in 0..9 {
            progress = progress.advance();
        }
        assert!(progress.is_complete());
        assert!((progress.percent() - 100.0).abs() < f64::EPSILON);
    }
}
