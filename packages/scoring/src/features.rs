//! Per-city feature vectors for learned scoring models.

use flu_risk_observation_models::Observation;
use flu_risk_scoring_models::CityFeatures;

use crate::stats::{mean, pearson, sample_std, sample_variance, slope};

/// Builds the feature vector for `city` from its rows.
///
/// Rows are ordered by date before the trend slopes are taken. Population
/// and land area are averaged over the rows. An empty slice yields all-zero
/// features.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn extract_features(city: &str, rows: &[&Observation]) -> CityFeatures {
    let mut ordered: Vec<&Observation> = rows.to_vec();
    ordered.sort_by_key(|o| o.date);

    let sales: Vec<f64> = ordered.iter().map(|o| o.sales as f64).collect();
    let flu: Vec<f64> = ordered.iter().map(|o| o.flu_cases as f64).collect();
    let population: Vec<f64> = ordered.iter().map(|o| o.population as f64).collect();
    let land_area: Vec<f64> = ordered.iter().map(|o| o.land_area).collect();

    CityFeatures {
        city: city.to_string(),
        total_sales: sales.iter().sum(),
        avg_daily_sales: mean(&sales),
        sales_std: sample_std(&sales),
        sales_trend: slope(&sales),
        peak_sales: peak(&sales),
        sales_variance: sample_variance(&sales),
        total_flu_cases: flu.iter().sum(),
        avg_daily_flu_cases: mean(&flu),
        flu_cases_std: sample_std(&flu),
        flu_cases_trend: slope(&flu),
        peak_flu_cases: peak(&flu),
        flu_cases_variance: sample_variance(&flu),
        sales_flu_correlation: pearson(&sales, &flu),
        population: mean(&population),
        land_area: mean(&land_area),
    }
}

fn peak(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}
