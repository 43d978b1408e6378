#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the flu risk server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the scoring types so the wire contract (snake case keys, values
//! rounded to one decimal, dates as `YYYY-MM-DD` strings) can evolve
//! independently of the engine.

use std::collections::BTreeMap;

use flu_risk_observation_models::Province;
use flu_risk_scoring_models::{ForecastSeries, RiskEstimate, RiskSnapshot};
use serde::{Deserialize, Serialize};

/// Rounds a risk value to one decimal place for display.
#[must_use]
pub fn round_risk(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn rounded_series(series: &ForecastSeries) -> BTreeMap<String, f64> {
    series
        .by_date()
        .into_iter()
        .map(|(date, value)| (date, round_risk(value)))
        .collect()
}

/// Response of `GET /api/flu-risk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiRiskSnapshot {
    /// Country-wide risk.
    pub national_risk: f64,
    /// Risk per province code.
    pub provincial_risks: BTreeMap<String, f64>,
    /// Current risk per city.
    pub current_city_risks: BTreeMap<String, f64>,
    /// Forecast per city, keyed by date.
    pub future_risks: BTreeMap<String, BTreeMap<String, f64>>,
}

impl From<&RiskSnapshot> for ApiRiskSnapshot {
    fn from(snapshot: &RiskSnapshot) -> Self {
        Self {
            national_risk: round_risk(snapshot.national.value()),
            provincial_risks: snapshot
                .provincial
                .iter()
                .map(|(province, estimate)| (province.to_string(), round_risk(estimate.value())))
                .collect(),
            current_city_risks: snapshot
                .cities
                .iter()
                .map(|(city, estimate)| (city.clone(), round_risk(estimate.value())))
                .collect(),
            future_risks: snapshot
                .forecasts
                .iter()
                .map(|(city, series)| (city.clone(), rounded_series(series)))
                .collect(),
        }
    }
}

/// Response of `GET /api/flu-risk/{location}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiCityRisk {
    /// Current risk.
    pub current_risk: f64,
    /// Forecast keyed by date; the first entry equals `current_risk`.
    pub future_risks: BTreeMap<String, f64>,
}

impl ApiCityRisk {
    /// Builds the response from a current estimate and its forecast.
    #[must_use]
    pub fn new(current: &RiskEstimate, forecast: &ForecastSeries) -> Self {
        Self {
            current_risk: round_risk(current.value()),
            future_risks: rounded_series(forecast),
        }
    }
}

/// Response of `GET /api/flu-risk/province/{code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiProvinceRisk {
    /// Two-letter code.
    pub province: Province,
    /// Full name.
    pub name: String,
    /// Provincial risk, rounded to one decimal.
    pub risk: f64,
}

impl ApiProvinceRisk {
    /// Builds the response for `province` from its estimate.
    #[must_use]
    pub fn new(province: Province, estimate: &RiskEstimate) -> Self {
        Self {
            province,
            name: province.name().to_string(),
            risk: round_risk(estimate.value()),
        }
    }
}

/// Query parameters for the city risk endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastQueryParams {
    /// Forecast horizon in days, defaulting to the configured horizon.
    pub days: Option<u32>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
