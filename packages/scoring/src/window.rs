//! Selection of the observations relevant to a reference date.
//!
//! The window is normally the trailing `window_days` days before "now". When
//! nothing falls inside that range (stale data), the rows of the most recent
//! `fallback_dates` distinct dates are used instead, so the engine never
//! scores an empty window while the store holds any data.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use flu_risk_observation_models::{Observation, city_key};
use flu_risk_scoring_models::ScoringConfig;
use sha2::{Digest as _, Sha256};

use crate::ScoringError;

/// How a window's rows were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// Rows dated on or after `now - window_days`.
    Trailing,
    /// Rows of the most recent distinct dates, ignoring `now`.
    MostRecent,
}

/// Rows used as the basis of one scoring computation, most recent first.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    kind: WindowKind,
    rows: Vec<Observation>,
}

impl Window {
    /// How the rows were chosen.
    #[must_use]
    pub const fn kind(&self) -> WindowKind {
        self.kind
    }

    /// Rows ordered by date descending, then by city key.
    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Distinct dates covered, most recent first.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|o| o.date).collect();
        dates.dedup();
        dates
    }

    /// Rows whose city matches `city` case-insensitively.
    #[must_use]
    pub fn city_rows(&self, city: &str) -> Vec<&Observation> {
        self.rows.iter().filter(|o| o.is_city(city)).collect()
    }

    /// Distinct city keys present.
    #[must_use]
    pub fn cities(&self) -> BTreeSet<String> {
        self.rows.iter().map(Observation::city_key).collect()
    }

    /// SHA-256 hex digest of the window content, stable for identical rows.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(match self.kind {
            WindowKind::Trailing => b"trailing".as_slice(),
            WindowKind::MostRecent => b"most-recent".as_slice(),
        });
        for row in &self.rows {
            hasher.update(city_key(&row.city).as_bytes());
            hasher.update([0_u8]);
            hasher.update(row.province.as_ref().as_bytes());
            hasher.update(row.date.format("%Y-%m-%d").to_string().as_bytes());
            hasher.update(row.sales.to_le_bytes());
            hasher.update(row.flu_cases.to_le_bytes());
            hasher.update(row.population.to_le_bytes());
            hasher.update(row.land_area.to_bits().to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Chooses the window for a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelector {
    window_days: u32,
    fallback_dates: usize,
}

impl WindowSelector {
    /// Creates a selector with explicit bounds.
    #[must_use]
    pub const fn new(window_days: u32, fallback_dates: usize) -> Self {
        Self {
            window_days,
            fallback_dates,
        }
    }

    /// Creates a selector from the engine configuration.
    #[must_use]
    pub const fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.window_days, config.fallback_dates)
    }

    /// Selects the window for `now` out of `observations`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::EmptyDataset`] if `observations` is empty.
    pub fn select(
        &self,
        observations: &[Observation],
        now: NaiveDate,
    ) -> Result<Window, ScoringError> {
        if observations.is_empty() {
            return Err(ScoringError::EmptyDataset);
        }

        let cutoff = now
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN);

        let trailing: Vec<Observation> = observations
            .iter()
            .filter(|o| o.date >= cutoff)
            .cloned()
            .collect();

        let (kind, mut rows) = if trailing.is_empty() {
            let distinct: BTreeSet<NaiveDate> = observations.iter().map(|o| o.date).collect();
            let recent: BTreeSet<NaiveDate> = distinct
                .into_iter()
                .rev()
                .take(self.fallback_dates.max(1))
                .collect();
            log::debug!(
                "No observations on or after {cutoff}; falling back to the {} most recent dates",
                recent.len()
            );
            let rows = observations
                .iter()
                .filter(|o| recent.contains(&o.date))
                .cloned()
                .collect();
            (WindowKind::MostRecent, rows)
        } else {
            (WindowKind::Trailing, trailing)
        };

        rows.sort_by_cached_key(|o| (Reverse(o.date), o.city_key()));

        Ok(Window { kind, rows })
    }
}
