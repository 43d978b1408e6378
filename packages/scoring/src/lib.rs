#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flu risk scoring and forecasting.
//!
//! Turns a window of daily observations into bounded risk indices (1 to 10)
//! for cities, provinces, and the whole country, and projects city risk a
//! few days forward.
//!
//! The pipeline, leaves first:
//!
//! 1. [`window::WindowSelector`] picks the observations relevant to "now".
//! 2. [`metrics::city_metrics`] derives base rate, density factor, and trend
//!    per city.
//! 3. [`normalize::NormalizationPolicy`] maps raw scores onto the risk scale.
//! 4. [`forecast::forecast_city`] projects a city's risk forward.
//! 5. [`aggregate`] rolls rows up to provincial and national scores.
//! 6. [`engine::ScoringEngine`] composes the above behind one query API.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod engine;
pub mod features;
pub mod forecast;
pub mod jitter;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod seasonal;
pub mod stats;
pub mod window;

use flu_risk_observation::ObservationError;
use flu_risk_scoring_models::Scope;
use thiserror::Error;

pub use engine::{ScoringBackend, ScoringEngine};
pub use jitter::{JitterSource, NoJitter, SeededJitter};
pub use model::{LinearScoringModel, ScoringModel};

/// Errors returned by scoring operations.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The observation store holds no usable rows.
    #[error("no data available")]
    EmptyDataset,

    /// The requested city or province has no data under any fallback.
    #[error("Unknown {scope} '{id}'")]
    UnknownLocation {
        /// Scope that was queried.
        scope: Scope,
        /// Identifier that was not found.
        id: String,
    },

    /// The observation store could not be read.
    #[error("Observation store error: {0}")]
    Store(#[from] ObservationError),

    /// The configuration is invalid.
    #[error("Invalid configuration: {message}")]
    Config {
        /// What is wrong with it.
        message: String,
    },
}
