//! Short-horizon projection of a city's risk.

use chrono::{Days, NaiveDate};
use flu_risk_scoring_models::{ForecastSeries, RiskEstimate, Scope};

use crate::jitter::JitterSource;
use crate::seasonal::seasonal_factor_for;

/// Half-width of the multiplicative jitter applied from day one onwards.
pub const FORECAST_JITTER: f64 = 0.1;

/// Projects `initial_risk` forward `days` calendar days starting at `now`.
///
/// Day zero is `initial_risk` unchanged. Later days extrapolate the trend
/// linearly, scale by a uniform factor in `[0.9, 1.1)` and by the seasonal
/// factor of the future date's own month, then clamp.
pub fn forecast_city(
    city: &str,
    initial_risk: f64,
    trend: f64,
    now: NaiveDate,
    days: u32,
    jitter: &mut dyn JitterSource,
) -> ForecastSeries {
    let points = (0..days)
        .map_while(|offset| {
            let future = now.checked_add_days(Days::new(u64::from(offset)))?;
            let projected = if offset == 0 {
                initial_risk
            } else {
                let linear = initial_risk * trend.mul_add(f64::from(offset), 1.0);
                let varied = linear * (1.0 + jitter.symmetric(FORECAST_JITTER));
                varied * seasonal_factor_for(future)
            };
            Some(RiskEstimate::bounded(Scope::City, city, future, projected))
        })
        .collect();

    ForecastSeries {
        city: city.to_string(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{NoJitter, SeededJitter};
    use crate::test_support::date;

    #[test]
    fn day_zero_is_initial_risk() {
        let mut jitter = SeededJitter::from_seed(8);
        let series = forecast_city("ottawa", 4.37, 0.2, date("2024-01-10"), 7, &mut jitter);
        assert_eq!(series.len(), 7);
        assert_eq!(series.first().unwrap().value().to_bits(), 4.37_f64.to_bits());
        assert_eq!(series.first().unwrap().date(), date("2024-01-10"));
    }

    #[test]
    fn dates_are_consecutive() {
        let series = forecast_city("ottawa", 3.0, 0.0, date("2024-02-27"), 7, &mut NoJitter);
        let dates: Vec<String> = series.by_date().into_keys().collect();
        assert_eq!(
            dates,
            vec![
                "2024-02-27",
                "2024-02-28",
                "2024-02-29",
                "2024-03-01",
                "2024-03-02",
                "2024-03-03",
                "2024-03-04",
            ]
        );
    }

    #[test]
    fn future_month_drives_seasonal_factor() {
        // July 29 (1.0) into August stays baseline; Sept 28 into October is 1.2.
        let summer = forecast_city("x", 2.0, 0.0, date("2024-07-29"), 5, &mut NoJitter);
        assert!(summer.points.iter().all(|p| (p.value() - 2.0).abs() < 1e-9));

        let autumn = forecast_city("x", 2.0, 0.0, date("2024-09-28"), 5, &mut NoJitter);
        let values: Vec<f64> = autumn.points.iter().map(RiskEstimate::value).collect();
        assert!((values[1] - 2.0).abs() < 1e-9);
        assert!((values[2] - 2.0).abs() < 1e-9);
        assert!((values[3] - 2.4).abs() < 1e-9);
        assert!((values[4] - 2.4).abs() < 1e-9);
    }

    #[test]
    fn linear_trend_without_jitter() {
        let series = forecast_city("x", 2.0, 0.1, date("2024-06-01"), 4, &mut NoJitter);
        let values: Vec<f64> = series.points.iter().map(RiskEstimate::value).collect();
        assert!((values[1] - 2.2).abs() < 1e-9);
        assert!((values[2] - 2.4).abs() < 1e-9);
        assert!((values[3] - 2.6).abs() < 1e-9);
    }

    #[test]
    fn values_stay_bounded() {
        let mut jitter = SeededJitter::from_seed(21);
        for trend in [-5.0, -0.5, 0.0, 0.5, 5.0] {
            let series = forecast_city("x", 9.5, trend, date("2024-12-28"), 14, &mut jitter);
            assert!(
                series
                    .points
                    .iter()
                    .all(|p| (1.0..=10.0).contains(&p.value()))
            );
        }
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut jitter = SeededJitter::from_seed(4);
        let series = forecast_city("x", 5.0, 0.0, date("2024-06-01"), 30, &mut jitter);
        for point in series.points.iter().skip(1) {
            assert!((4.5..5.5).contains(&point.value()), "{}", point.value());
        }
    }

    #[test]
    fn zero_days_is_empty() {
        let series = forecast_city("x", 5.0, 0.0, date("2024-06-01"), 0, &mut NoJitter);
        assert!(series.is_empty());
    }
}
