//! Timestamp formatting for progress lines and settings files.

use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;

/// Represents a local wall-clock timestamp.
pub type Timestamp = DateTime<Local>;

/// Returns the current local time.
#[must_use]
pub fn now_local() -> Timestamp {
    Local::now()
}

/// Formats a timestamp for progress lines, e.g. `2023-10-05 14:30:00`.
#[must_use]
pub fn format_clock<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a timestamp for use in a file name, e.g. `20231005_143000`.
#[must_use]
pub fn file_stamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y%m%d_%H%M%S").to_string()
}

/// Formats an elapsed duration as `H:MM:SS[.ffffff]`, prefixed by
/// `N day(s), ` once it exceeds a day.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cryoflow::utils::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3723)), "1:02:03");
/// assert_eq!(format_elapsed(Duration::from_millis(1500)), "0:00:01.500000");
/// ```
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let micros = elapsed.subsec_micros();

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if days > 0 {
        let unit = if days == 1 { "day" } else { "days" };
        out.push_str(&format!("{days} {unit}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_clock() {
        let dt = Utc.with_ymd_and_hms(2023, 10, 5, 14, 30, 0).unwrap();
        assert_eq!(format_clock(&dt), "2023-10-05 14:30:00");
    }

    #[test]
    fn test_file_stamp() {
        let dt = Utc.with_ymd_and_hms(2023, 10, 5, 4, 3, 9).unwrap();
        assert_eq!(file_stamp(&dt), "20231005_040309");
    }

    #[test]
    fn test_format_elapsed_whole_seconds() {
        assert_eq!(format_elapsed(Duration::ZERO), "0:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "0:00:59");
        assert_eq!(format_elapsed(Duration::from_secs(3600 * 5 + 7)), "5:00:07");
    }

    #[test]
    fn test_format_elapsed_fraction() {
        assert_eq!(
            format_elapsed(Duration::from_micros(61_000_042)),
            "0:01:01.000042"
        );
    }

    #[test]
    fn test_format_elapsed_days() {
        assert_eq!(format_elapsed(Duration::from_secs(86_400 + 60)), "1 day, 0:01:00");
        assert_eq!(format_elapsed(Duration::from_secs(2 * 86_400)), "2 days, 0:00:00");
    }
}
