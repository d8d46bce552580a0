// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cleanup verification validators.
//!
//! Two independent checks guard the worker flow: the worker must be
//! physically close to the report when capturing the "before" photo, and
//! the before/after photo pair must be a plausible cleanup interval.
//! Both return typed results so callers can surface exact reasons.

use crate::services::geo::haversine_distance_m;
use chrono::{DateTime, Utc};

/// Maximum distance between worker and report at cleanup start.
pub const MAX_WORKER_DISTANCE_M: f64 = 50.0;
/// Minimum minutes between before and after photos.
pub const MIN_CLEANUP_MINUTES: f64 = 2.0;
/// Maximum minutes between before and after photos.
pub const MAX_CLEANUP_MINUTES: f64 = 240.0;

/// Outcome of the worker proximity check.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityCheck {
    pub is_valid: bool,
    pub distance_m: f64,
    pub max_allowed_m: f64,
    pub error: Option<String>,
}

/// Outcome of the before/after photo timing check.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingCheck {
    pub is_valid: bool,
    pub minutes_between: f64,
    pub min_required: f64,
    pub max_allowed: f64,
    pub error: Option<String>,
}

/// Check that the worker is within [`MAX_WORKER_DISTANCE_M`] of the
/// report location. Exactly on the boundary is valid.
pub fn validate_worker_proximity(
    worker_lat: f64,
    worker_lng: f64,
    report_lat: f64,
    report_lng: f64,
) -> ProximityCheck {
    let distance_m = haversine_distance_m(worker_lat, worker_lng, report_lat, report_lng);
    let is_valid = distance_m <= MAX_WORKER_DISTANCE_M;

    ProximityCheck {
        is_valid,
        distance_m,
        max_allowed_m: MAX_WORKER_DISTANCE_M,
        error: (!is_valid).then(|| {
            format!(
                "Worker is {:.0}m from the report location (max {:.0}m)",
                distance_m, MAX_WORKER_DISTANCE_M
            )
        }),
    }
}

/// Check that the before/after interval is within
/// [[`MIN_CLEANUP_MINUTES`], [`MAX_CLEANUP_MINUTES`]], inclusive on both
/// boundaries. A negative interval is its own error, distinct from "too
/// short".
pub fn validate_photo_timing(before: DateTime<Utc>, after: DateTime<Utc>) -> TimingCheck {
    let minutes_between = (after - before).num_seconds() as f64 / 60.0;

    let error = if after < before {
        Some("After photo timestamp is earlier than the before photo".to_string())
    } else if minutes_between < MIN_CLEANUP_MINUTES {
        Some(format!(
            "Cleanup must take at least {:.0} minutes",
            MIN_CLEANUP_MINUTES
        ))
    } else if minutes_between > MAX_CLEANUP_MINUTES {
        Some(format!(
            "Cleanup must be completed within {:.0} minutes",
            MAX_CLEANUP_MINUTES
        ))
    } else {
        None
    };

    TimingCheck {
        is_valid: error.is_none(),
        minutes_between,
        min_required: MIN_CLEANUP_MINUTES,
        max_allowed: MAX_CLEANUP_MINUTES,
        error,
    }
}

/// Whole minutes between start and completion, round-half-up, floor 0.
pub fn calculate_time_spent(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> u32 {
    let seconds = (completed_at - started_at).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    ((seconds as f64 / 60.0) + 0.5).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
    }

    // ~49m and ~51m north of the reference point (1 deg lat ~ 111.19 km)
    const REPORT_LAT: f64 = 37.7749;
    const REPORT_LNG: f64 = -122.4194;
    const LAT_49M: f64 = REPORT_LAT + 49.0 / 111_194.9;
    const LAT_51M: f64 = REPORT_LAT + 51.0 / 111_194.9;

    #[test]
    fn test_proximity_within_limit() {
        let check = validate_worker_proximity(LAT_49M, REPORT_LNG, REPORT_LAT, REPORT_LNG);
        assert!(check.is_valid);
        assert!(check.error.is_none());
        assert!((check.distance_m - 49.0).abs() < 0.5);
    }

    #[test]
    fn test_proximity_beyond_limit() {
        let check = validate_worker_proximity(LAT_51M, REPORT_LNG, REPORT_LAT, REPORT_LNG);
        assert!(!check.is_valid);
        assert!(check.error.is_some());
        assert!((check.distance_m - 51.0).abs() < 0.5);
    }

    #[test]
    fn test_proximity_zero_distance() {
        let check = validate_worker_proximity(REPORT_LAT, REPORT_LNG, REPORT_LAT, REPORT_LNG);
        assert!(check.is_valid);
        assert_eq!(check.distance_m, 0.0);
        assert_eq!(check.max_allowed_m, 50.0);
    }

    #[test]
    fn test_timing_too_short() {
        let before = base_time();
        let check = validate_photo_timing(before, before + Duration::seconds(90));
        assert!(!check.is_valid);
        assert!(check.error.as_deref().unwrap().contains("at least 2"));
        assert_eq!(check.minutes_between, 1.5);
    }

    #[test]
    fn test_timing_boundaries_inclusive() {
        let before = base_time();
        let at_min = validate_photo_timing(before, before + Duration::minutes(2));
        assert!(at_min.is_valid);

        let at_max = validate_photo_timing(before, before + Duration::minutes(240));
        assert!(at_max.is_valid);
    }

    #[test]
    fn test_timing_too_long() {
        let before = base_time();
        let check = validate_photo_timing(before, before + Duration::minutes(241));
        assert!(!check.is_valid);
        assert!(check.error.as_deref().unwrap().contains("240"));
    }

    #[test]
    fn test_timing_negative_interval_is_distinct() {
        let before = base_time();
        let check = validate_photo_timing(before, before - Duration::minutes(5));
        assert!(!check.is_valid);
        let msg = check.error.unwrap();
        assert!(msg.contains("earlier"), "got: {}", msg);
        assert!(!msg.contains("at least"));
    }

    #[test]
    fn test_time_spent_rounding() {
        let start = base_time();
        // 90s = 1.5 min rounds up to 2
        assert_eq!(calculate_time_spent(start, start + Duration::seconds(90)), 2);
        // 89s = 1.48 min rounds down to 1
        assert_eq!(calculate_time_spent(start, start + Duration::seconds(89)), 1);
        // 30 min exactly
        assert_eq!(calculate_time_spent(start, start + Duration::minutes(30)), 30);
        // Negative clamps to 0
        assert_eq!(calculate_time_spent(start, start - Duration::minutes(1)), 0);
        assert_eq!(calculate_time_spent(start, start), 0);
    }
}
