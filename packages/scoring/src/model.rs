//! Learned scoring backends.
//!
//! A [`ScoringModel`] maps a city's feature vector to an unbounded raw
//! score. The engine normalizes that score with the logistic policy, so a
//! model never needs to know about the risk scale.

use std::fmt::Debug;

use flu_risk_scoring_models::{CityFeatures, LinearModelConfig};

use crate::ScoringError;

/// Maps a feature vector to a raw, unbounded score.
pub trait ScoringModel: Debug + Send + Sync {
    /// Scores one city.
    fn score(&self, features: &CityFeatures) -> f64;
}

/// `bias + Σ weight_i * feature_i` over [`CityFeatures::NAMES`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScoringModel {
    bias: f64,
    weights: [f64; 15],
}

impl LinearScoringModel {
    /// Creates a model with weights in [`CityFeatures::NAMES`] order.
    #[must_use]
    pub const fn new(bias: f64, weights: [f64; 15]) -> Self {
        Self { bias, weights }
    }

    /// Builds a model from named weights.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] if a weight names an unknown feature.
    pub fn from_config(config: &LinearModelConfig) -> Result<Self, ScoringError> {
        let mut weights = [0.0; 15];
        for (name, weight) in &config.weights {
            let index = CityFeatures::NAMES
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| ScoringError::Config {
                    message: format!("unknown model feature '{name}'"),
                })?;
            weights[index] = *weight;
        }
        Ok(Self::new(config.bias, weights))
    }
}

impl ScoringModel for LinearScoringModel {
    fn score(&self, features: &CityFeatures) -> f64 {
        features
            .values()
            .iter()
            .zip(&self.weights)
            .fold(self.bias, |acc, (value, weight)| value.mul_add(*weight, acc))
    }
}
