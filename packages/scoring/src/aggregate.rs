//! Provincial and national roll-ups.
//!
//! Aggregate rates are pooled (`sum(flu_cases) / sum(population)`), never
//! averaged from per-city risks.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use flu_risk_observation_models::{Observation, Province};
use flu_risk_scoring_models::{RiskEstimate, Scope, clamp_risk};

use crate::metrics::base_risk_from_rate;
use crate::seasonal::seasonal_factor_for;
use crate::window::Window;

/// Identifier used for the national estimate.
pub const NATIONAL_ID: &str = "national";

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    flu_cases: u128,
    population: u128,
}

impl Totals {
    fn add(&mut self, row: &Observation) {
        self.flu_cases += u128::from(row.flu_cases);
        self.population += u128::from(row.population);
    }

    #[allow(clippy::cast_precision_loss)]
    fn flu_per_100k(self) -> f64 {
        if self.population == 0 {
            return 0.0;
        }
        self.flu_cases as f64 / self.population as f64 * 100_000.0
    }

    fn risk(self, multiplier: f64, now: NaiveDate) -> f64 {
        let base = base_risk_from_rate(self.flu_per_100k());
        clamp_risk(base * multiplier * seasonal_factor_for(now))
    }
}

/// One estimate per province present in `window`.
#[must_use]
pub fn provincial_risks(
    window: &Window,
    now: NaiveDate,
    multiplier: f64,
) -> BTreeMap<Province, RiskEstimate> {
    let mut totals: BTreeMap<Province, Totals> = BTreeMap::new();
    for row in window.rows() {
        totals.entry(row.province).or_default().add(row);
    }
    totals
        .into_iter()
        .map(|(province, t)| {
            let value = t.risk(multiplier, now);
            let estimate = RiskEstimate::bounded(Scope::Province, province.as_ref(), now, value);
            (province, estimate)
        })
        .collect()
}

/// Estimate for a single province, or `None` if it has no rows in `window`.
#[must_use]
pub fn province_risk(
    window: &Window,
    province: Province,
    now: NaiveDate,
    multiplier: f64,
) -> Option<RiskEstimate> {
    let mut totals = Totals::default();
    let mut seen = false;
    for row in window.rows().iter().filter(|o| o.province == province) {
        totals.add(row);
        seen = true;
    }
    seen.then(|| {
        let value = totals.risk(multiplier, now);
        RiskEstimate::bounded(Scope::Province, province.as_ref(), now, value)
    })
}

/// Estimate over every row in `window`.
#[must_use]
pub fn national_risk(window: &Window, now: NaiveDate, multiplier: f64) -> RiskEstimate {
    let mut totals = Totals::default();
    for row in window.rows() {
        totals.add(row);
    }
    RiskEstimate::bounded(Scope::National, NATIONAL_ID, now, totals.risk(multiplier, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, row};
    use crate::window::WindowSelector;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn july_window(rows: &[Observation]) -> Window {
        WindowSelector::new(7, 7)
            .select(rows, date("2024-07-20"))
            .unwrap()
    }

    #[test]
    fn province_pools_counts_rather_than_averaging_risks() {
        // Big city: 600 cases / 1M = 60 per 100k. Small town: 90 / 10k = 900.
        let rows = vec![
            row("Big", Province::Bc, "2024-07-20", 0, 600, 1_000_000, 100.0),
            row("Small", Province::Bc, "2024-07-20", 0, 90, 10_000, 100.0),
        ];
        let window = july_window(&rows);
        let risks = provincial_risks(&window, date("2024-07-20"), 1.2);
        let bc = &risks[&Province::Bc];

        // pooled: 690 / 1.01M * 100k = 68.3168 -> 1.366 * 1.2 * 1.0
        let pooled = 690.0 / 1_010_000.0 * 100_000.0 / 50.0 * 1.2;
        assert!(close(bc.value(), pooled));

        // averaging per-city base risks would give (1.2 + 10) / 2 * 1.2
        let averaged = f64::midpoint(1.2, 10.0) * 1.2;
        assert!((bc.value() - averaged).abs() > 1.0);
        assert_eq!(bc.scope(), Scope::Province);
        assert_eq!(bc.id(), "BC");
    }

    #[test]
    fn one_estimate_per_province() {
        let rows = vec![
            row("Vancouver", Province::Bc, "2024-07-20", 0, 100, 600_000, 115.0),
            row("Toronto", Province::On, "2024-07-20", 0, 100, 2_700_000, 630.0),
            row("Ottawa", Province::On, "2024-07-19", 0, 100, 1_000_000, 2_790.0),
        ];
        let window = july_window(&rows);
        let risks = provincial_risks(&window, date("2024-07-20"), 1.2);
        let provinces: Vec<Province> = risks.keys().copied().collect();
        assert_eq!(provinces, vec![Province::Bc, Province::On]);
        assert_eq!(
            province_risk(&window, Province::On, date("2024-07-20"), 1.2).as_ref(),
            risks.get(&Province::On)
        );
        assert!(province_risk(&window, Province::Pe, date("2024-07-20"), 1.2).is_none());
    }

    #[test]
    fn national_uses_its_own_multiplier_in_winter() {
        let rows = vec![
            row("A", Province::Mb, "2024-01-20", 0, 1_500, 1_000_000, 100.0),
            row("B", Province::Sk, "2024-01-20", 0, 500, 1_000_000, 100.0),
        ];
        let window = WindowSelector::new(7, 7)
            .select(&rows, date("2024-01-20"))
            .unwrap();
        let national = national_risk(&window, date("2024-01-20"), 1.3);
        // 2000 / 2M * 100k = 100 -> base 2 -> 2 * 1.3 * 1.5
        assert!(close(national.value(), 3.9));
        assert_eq!(national.id(), NATIONAL_ID);
        assert_eq!(national.scope(), Scope::National);
    }

    #[test]
    fn aggregates_are_clamped() {
        let rows = vec![row("Hot", Province::Yt, "2024-07-20", 0, 50_000, 100_000, 100.0)];
        let window = july_window(&rows);
        assert!(close(national_risk(&window, date("2024-07-20"), 1.3).value(), 10.0));

        let quiet = vec![row("Cold", Province::Yt, "2024-07-20", 0, 0, 100_000, 100.0)];
        let window = july_window(&quiet);
        assert!(close(national_risk(&window, date("2024-07-20"), 1.3).value(), 1.3));
    }
}
