//! Mapping of raw scores onto the `[1, 10]` risk scale.
//!
//! Two policies share one entry point, [`NormalizationPolicy::normalize`]:
//!
//! * [`NormalizationPolicy::Heuristic`] clamps values that the closed-form
//!   heuristic already produces on the risk scale.
//! * [`NormalizationPolicy::Logistic`] rescales unbounded model output into
//!   the batch's observed range, squashes it with a logistic curve, adds a
//!   small bounded jitter, and rounds to one decimal.

use flu_risk_scoring_models::{MAX_RISK, MIN_RISK, clamp_risk};

use crate::jitter::JitterSource;

/// Observed minimum and maximum raw score across the current batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedRange {
    /// Smallest raw score in the batch.
    pub min: f64,
    /// Largest raw score in the batch.
    pub max: f64,
}

impl ObservedRange {
    /// Range spanning every finite value in `scores`, or `None` if there are
    /// none.
    #[must_use]
    pub fn of(scores: impl IntoIterator<Item = f64>) -> Option<Self> {
        scores
            .into_iter()
            .filter(|s| s.is_finite())
            .fold(None, |range, s| match range {
                None => Some(Self { min: s, max: s }),
                Some(Self { min, max }) => Some(Self {
                    min: min.min(s),
                    max: max.max(s),
                }),
            })
    }

    /// Whether the range has zero width.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() < f64::EPSILON
    }
}

impl Default for ObservedRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: MAX_RISK,
        }
    }
}

/// Shape of the logistic squash used for learned-model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Slope of the logistic curve.
    pub steepness: f64,
    /// Rescaled input at which the curve crosses one half.
    pub midpoint: f64,
    /// Total width of the symmetric jitter added after scaling.
    pub jitter_width: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            steepness: 1.2,
            midpoint: 0.1,
            jitter_width: 0.5,
        }
    }
}

/// Normalization strategy, chosen when the engine is configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizationPolicy {
    /// `max(1, min(10, raw))`, no jitter.
    Heuristic,
    /// Range rescale, logistic squash, jitter, one-decimal rounding.
    Logistic(LogisticParams),
}

impl NormalizationPolicy {
    /// Maps `raw` onto the risk scale.
    ///
    /// `range` is only consulted by the logistic policy; `None` means the
    /// default `[0, 10]` range. A degenerate range (one-element batch) maps
    /// to the minimum risk.
    pub fn normalize(
        &self,
        raw: f64,
        range: Option<ObservedRange>,
        jitter: &mut dyn JitterSource,
    ) -> f64 {
        match self {
            Self::Heuristic => clamp_risk(raw),
            Self::Logistic(params) => {
                let range = range.unwrap_or_default();
                if range.is_degenerate() {
                    return MIN_RISK;
                }
                let scaled = (raw - range.min) / (range.max - range.min);
                let squashed =
                    1.0 / (1.0 + (-params.steepness * (scaled - params.midpoint)).exp());
                let risk = (MAX_RISK - MIN_RISK).mul_add(squashed, MIN_RISK);
                let varied = clamp_risk(risk + jitter.symmetric(params.jitter_width / 2.0));
                round_one_decimal(varied)
            }
        }
    }
}

/// Rounds to one decimal place.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
