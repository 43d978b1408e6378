//! Value parsing helpers for observation sources.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses an observation date.
///
/// Accepts a plain ISO 8601 calendar date (`2024-01-15`) as well as
/// timestamps, whose time-of-day part is discarded.
#[must_use]
pub fn parse_observation_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
