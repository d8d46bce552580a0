// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and daily windows.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Start of the current UTC day.
///
/// The daily report window runs on UTC since the service does not trust
/// device-reported timezones.
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// Seconds remaining until the next UTC midnight.
pub fn seconds_until_next_utc_day(now: DateTime<Utc>) -> u64 {
    let next_midnight = start_of_utc_day(now) + Duration::days(1);
    (next_midnight - now).num_seconds().max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_of_utc_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 13, 45, 12).unwrap();
        let midnight = start_of_utc_day(now);
        assert_eq!(format_utc_rfc3339(midnight), "2024-03-05T00:00:00Z");
    }

    #[test]
    fn test_seconds_until_next_utc_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 30).unwrap();
        assert_eq!(seconds_until_next_utc_day(now), 30);

        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(seconds_until_next_utc_day(midnight), 86_400);
    }
}
