#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk estimate, forecast, and configuration types for the scoring engine.
//!
//! Every type here is a value object recomputed per scoring call. Risk values
//! are always bounded to [`MIN_RISK`]..=[`MAX_RISK`].

pub mod config;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use flu_risk_observation_models::Province;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use config::{BaseRatePolicy, LinearModelConfig, SalesRatioThresholds, ScoringConfig};

/// Lowest value on the risk scale.
pub const MIN_RISK: f64 = 1.0;

/// Highest value on the risk scale.
pub const MAX_RISK: f64 = 10.0;

/// Clamps a raw value onto the risk scale.
///
/// `NaN` maps to [`MIN_RISK`].
#[must_use]
pub fn clamp_risk(raw: f64) -> f64 {
    if raw.is_nan() {
        return MIN_RISK;
    }
    raw.clamp(MIN_RISK, MAX_RISK)
}

/// Granularity of a risk estimate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Scope {
    /// A single city.
    City,
    /// All cities in one province.
    Province,
    /// Every city in the window.
    National,
}

/// A bounded risk value for one scope on one date.
///
/// Constructed only through [`RiskEstimate::bounded`], which clamps the value
/// onto the risk scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEstimate {
    scope: Scope,
    id: String,
    date: NaiveDate,
    value: f64,
}

impl RiskEstimate {
    /// Creates an estimate, clamping `value` onto the risk scale.
    #[must_use]
    pub fn bounded(scope: Scope, id: impl Into<String>, date: NaiveDate, value: f64) -> Self {
        Self {
            scope,
            id: id.into(),
            date,
            value: clamp_risk(value),
        }
    }

    /// Scope of the estimate.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// City key, province code, or `"national"`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Date the estimate applies to.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Risk value in `[1, 10]`.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

/// Day-by-day projected risk for one city, starting at the reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSeries {
    /// City key the series belongs to.
    pub city: String,
    /// One estimate per consecutive calendar date.
    pub points: Vec<RiskEstimate>,
}

impl ForecastSeries {
    /// The day-zero estimate, equal to the city's current risk.
    #[must_use]
    pub fn first(&self) -> Option<&RiskEstimate> {
        self.points.first()
    }

    /// Number of days covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series covers no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values keyed by ISO 8601 date (`YYYY-MM-DD`).
    #[must_use]
    pub fn by_date(&self) -> BTreeMap<String, f64> {
        self.points
            .iter()
            .map(|p| (p.date().format("%Y-%m-%d").to_string(), p.value()))
            .collect()
    }
}

/// Per-city intermediate values derived from a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMetrics {
    /// City key.
    pub city: String,
    /// Flu cases per 100,000 residents.
    pub flu_per_100k: f64,
    /// Base risk before density and seasonal adjustment.
    pub base_risk: f64,
    /// Residents per square kilometre.
    pub population_density: f64,
    /// Density amplification, at most 1.5.
    pub density_factor: f64,
    /// Mean fractional change of the smoothed case series.
    pub trend: f64,
    /// Bounded risk for the reference date.
    pub initial_risk: f64,
    /// Whether the city had no rows in the window and the cross-city
    /// averages were used instead.
    pub fallback: bool,
}

/// Per-city inputs for a learned scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CityFeatures {
    /// City key.
    pub city: String,
    /// Sum of daily sales.
    pub total_sales: f64,
    /// Mean daily sales.
    pub avg_daily_sales: f64,
    /// Sample standard deviation of daily sales.
    pub sales_std: f64,
    /// Least-squares slope of daily sales.
    pub sales_trend: f64,
    /// Highest daily sales.
    pub peak_sales: f64,
    /// Sample variance of daily sales.
    pub sales_variance: f64,
    /// Sum of daily flu cases.
    pub total_flu_cases: f64,
    /// Mean daily flu cases.
    pub avg_daily_flu_cases: f64,
    /// Sample standard deviation of daily flu cases.
    pub flu_cases_std: f64,
    /// Least-squares slope of daily flu cases.
    pub flu_cases_trend: f64,
    /// Highest daily flu case count.
    pub peak_flu_cases: f64,
    /// Sample variance of daily flu cases.
    pub flu_cases_variance: f64,
    /// Pearson correlation of sales and flu cases, `0` when undefined.
    pub sales_flu_correlation: f64,
    /// Mean population over the rows.
    pub population: f64,
    /// Mean land area in square kilometres over the rows.
    pub land_area: f64,
}

impl CityFeatures {
    /// Feature names in [`CityFeatures::values`] order.
    pub const NAMES: [&'static str; 15] = [
        "total_sales",
        "avg_daily_sales",
        "sales_std",
        "sales_trend",
        "peak_sales",
        "sales_variance",
        "total_flu_cases",
        "avg_daily_flu_cases",
        "flu_cases_std",
        "flu_cases_trend",
        "peak_flu_cases",
        "flu_cases_variance",
        "sales_flu_correlation",
        "population",
        "land_area",
    ];

    /// Numeric features in [`CityFeatures::NAMES`] order.
    #[must_use]
    pub const fn values(&self) -> [f64; 15] {
        [
            self.total_sales,
            self.avg_daily_sales,
            self.sales_std,
            self.sales_trend,
            self.peak_sales,
            self.sales_variance,
            self.total_flu_cases,
            self.avg_daily_flu_cases,
            self.flu_cases_std,
            self.flu_cases_trend,
            self.peak_flu_cases,
            self.flu_cases_variance,
            self.sales_flu_correlation,
            self.population,
            self.land_area,
        ]
    }
}

/// Everything the query surface reports, computed from one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSnapshot {
    /// Reference date the snapshot was computed for.
    pub date: NaiveDate,
    /// Country-wide estimate.
    pub national: RiskEstimate,
    /// One estimate per province present in the window.
    pub provincial: BTreeMap<Province, RiskEstimate>,
    /// Current risk per known city.
    pub cities: BTreeMap<String, RiskEstimate>,
    /// Forecast per known city; day zero equals the city's current risk.
    pub forecasts: BTreeMap<String, ForecastSeries>,
}
