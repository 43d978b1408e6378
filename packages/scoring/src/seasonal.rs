//! Month-dependent risk multiplier.

use chrono::{Datelike as _, NaiveDate};

/// Multiplier for December, January, and February.
pub const WINTER_FACTOR: f64 = 1.5;

/// Multiplier for March, April, October, and November.
pub const SHOULDER_FACTOR: f64 = 1.2;

/// Multiplier for every other month.
pub const BASELINE_FACTOR: f64 = 1.0;

/// Returns the seasonal multiplier for a calendar month (`1..=12`).
///
/// Months outside that range get the baseline factor.
#[must_use]
pub const fn seasonal_factor(month: u32) -> f64 {
    match month {
        12 | 1 | 2 => WINTER_FACTOR,
        3 | 4 | 10 | 11 => SHOULDER_FACTOR,
        _ => BASELINE_FACTOR,
    }
}

/// Returns the seasonal multiplier for the month `date` falls in.
#[must_use]
pub fn seasonal_factor_for(date: NaiveDate) -> f64 {
    seasonal_factor(date.month())
}
