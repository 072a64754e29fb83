//! Wall-clock helpers
//!
//! Records carry epoch-millisecond timestamps, so every time-dependent store
//! operation works on plain `i64` milliseconds. These helpers read the clock
//! and format instants and durations for API responses.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Duration as whole milliseconds, saturating on overflow
pub fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Format epoch milliseconds as RFC 3339 with millisecond precision
///
/// Falls back to the raw number if the instant is outside chrono's range.
pub fn to_iso(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

/// Human-readable duration, e.g. "2 hours" or "30 minutes"
pub fn humanize(duration: Duration) -> String {
    let secs = duration.as_secs();

    let (amount, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };

    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_iso() {
        assert_eq!(to_iso(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(to_iso(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize(Duration::from_secs(2 * 60 * 60)), "2 hours");
        assert_eq!(humanize(Duration::from_secs(60 * 60)), "1 hour");
        assert_eq!(humanize(Duration::from_secs(30 * 60)), "30 minutes");
        assert_eq!(humanize(Duration::from_secs(90 * 60)), "90 minutes");
        assert_eq!(humanize(Duration::from_secs(45)), "45 seconds");
        assert_eq!(humanize(Duration::from_secs(1)), "1 second");
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(duration_millis(Duration::from_secs(7200)), 7_200_000);
    }
}
