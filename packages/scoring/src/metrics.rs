//! Per-city base rate, density factor, and trend.
//!
//! A city without rows in the window is scored from the whole window
//! instead (the cross-city average). The returned [`CityMetrics`] records
//! when that fallback was taken.

use chrono::NaiveDate;
use flu_risk_observation_models::{Observation, city_key};
use flu_risk_scoring_models::{
    BaseRatePolicy, CityMetrics, SalesRatioThresholds, ScoringConfig, clamp_risk,
};

use crate::seasonal::seasonal_factor_for;
use crate::stats::{mean, mean_pct_change, moving_average};
use crate::window::Window;

/// Cases per this many residents.
const PER_CAPITA_SCALE: f64 = 100_000.0;

/// Cases per 100k that map to one risk point.
const CASES_PER_RISK_POINT: f64 = 50.0;

/// Density (per km²) that adds one full unit to the density factor.
const DENSITY_SCALE: f64 = 5_000.0;

/// Upper bound of the density factor.
const MAX_DENSITY_FACTOR: f64 = 1.5;

const SALES_RATIO_DENSITY_SCALE: f64 = 2_000.0;
const SALES_RATIO_MAX_DENSITY_FACTOR: f64 = 3.0;

/// Computes the metrics of `city` within `window` for reference date `now`.
#[must_use]
pub fn city_metrics(
    window: &Window,
    city: &str,
    now: NaiveDate,
    config: &ScoringConfig,
) -> CityMetrics {
    let key = city_key(city);
    let mut rows = window.city_rows(&key);
    let fallback = rows.is_empty();
    if fallback {
        log::debug!("No rows for '{key}' in window; using cross-city averages");
        rows = window.rows().iter().collect();
    }
    rows.sort_by_cached_key(|o| (o.date, o.city_key()));

    let flu = column(&rows, |o| o.flu_cases);
    let sales = column(&rows, |o| o.sales);
    let population = column(&rows, |o| o.population);
    let land_area: Vec<f64> = rows.iter().map(|o| o.land_area).collect();

    let mean_population = mean(&population);
    let flu_per_100k = ratio(mean(&flu), mean_population) * PER_CAPITA_SCALE;
    let population_density = ratio(mean_population, mean(&land_area));

    let (base_risk, density_factor) = match &config.base_rate {
        BaseRatePolicy::FluPer100k => (
            base_risk_from_rate(flu_per_100k),
            (1.0 + population_density / DENSITY_SCALE).min(MAX_DENSITY_FACTOR),
        ),
        BaseRatePolicy::SalesRatio(thresholds) => (
            sales_ratio_risk(mean(&flu), mean(&sales), population_density, thresholds),
            1.0,
        ),
    };

    let smoothed = moving_average(&flu, config.smoothing_period);
    let trend = mean_pct_change(&smoothed);
    let initial_risk = clamp_risk(base_risk * density_factor * seasonal_factor_for(now));

    CityMetrics {
        city: key,
        flu_per_100k,
        base_risk,
        population_density,
        density_factor,
        trend,
        initial_risk,
        fallback,
    }
}

/// `clamp(flu_per_100k / 50)`, shared by city and aggregate scoring.
#[must_use]
pub fn base_risk_from_rate(flu_per_100k: f64) -> f64 {
    clamp_risk(flu_per_100k / CASES_PER_RISK_POINT)
}

/// Flu-to-sales ratio scaled by a density multiplier and bucketed into
/// `1, 3, 7, 10`.
#[must_use]
pub fn sales_ratio_risk(
    mean_flu: f64,
    mean_sales: f64,
    population_density: f64,
    thresholds: &SalesRatioThresholds,
) -> f64 {
    let multiplier = (1.0 + population_density / SALES_RATIO_DENSITY_SCALE)
        .min(SALES_RATIO_MAX_DENSITY_FACTOR);
    let adjusted = ratio(mean_flu, mean_sales) * multiplier;
    if adjusted < thresholds.low {
        1.0
    } else if adjusted < thresholds.medium {
        3.0
    } else if adjusted < thresholds.high {
        7.0
    } else {
        10.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn column(rows: &[&Observation], field: impl Fn(&Observation) -> u64) -> Vec<f64> {
    rows.iter().map(|&o| field(o) as f64).collect()
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
