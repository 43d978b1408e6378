//! Scoring engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tunables for the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Trailing days (inclusive of the cutoff date) that make up the window.
    pub window_days: u32,
    /// Number of most recent distinct dates used when the trailing window is
    /// empty.
    pub fallback_dates: usize,
    /// Days projected by the forecaster, day zero included.
    pub horizon_days: u32,
    /// Moving-average period used for trend extraction.
    pub smoothing_period: usize,
    /// Amplification applied to provincial scores.
    pub province_multiplier: f64,
    /// Amplification applied to the national score.
    pub national_multiplier: f64,
    /// How a city's base risk is derived.
    pub base_rate: BaseRatePolicy,
    /// Seed for the jitter generator. `None` seeds from entropy on every
    /// computation.
    pub jitter_seed: Option<u64>,
    /// Cities always reported, even without rows in the store.
    pub tracked_cities: Vec<String>,
    /// Weights for the built-in linear scoring model. When set, city scores
    /// come from the model instead of the closed-form heuristic.
    pub learned_model: Option<LinearModelConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            fallback_dates: 7,
            horizon_days: 7,
            smoothing_period: 7,
            province_multiplier: 1.2,
            national_multiplier: 1.3,
            base_rate: BaseRatePolicy::default(),
            jitter_seed: None,
            tracked_cities: Vec::new(),
            learned_model: None,
        }
    }
}

/// Formula used for a city's base risk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BaseRatePolicy {
    /// `clamp(flu_cases_per_100k / 50, 1, 10)`.
    #[default]
    #[serde(rename = "flu_per_100k")]
    FluPer100k,
    /// Flu-to-sales ratio, density adjusted and bucketed into 1, 3, 7, 10.
    SalesRatio(SalesRatioThresholds),
}

/// Bucket boundaries for [`BaseRatePolicy::SalesRatio`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesRatioThresholds {
    /// Ratios below this map to risk 1.
    pub low: f64,
    /// Ratios below this map to risk 3.
    pub medium: f64,
    /// Ratios below this map to risk 7; anything above maps to 10.
    pub high: f64,
}

impl Default for SalesRatioThresholds {
    fn default() -> Self {
        Self {
            low: 0.1,
            medium: 0.2,
            high: 0.3,
        }
    }
}

/// Coefficients of a linear scoring model over
/// [`crate::CityFeatures`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearModelConfig {
    /// Intercept.
    pub bias: f64,
    /// Weight per feature name; features without a weight contribute zero.
    pub weights: BTreeMap<String, f64>,
}
