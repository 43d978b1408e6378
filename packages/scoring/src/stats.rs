//! Small descriptive statistics over `f64` slices.
//!
//! Every function is total: inputs too short for a statistic produce `0.0`
//! instead of `NaN`.

/// Arithmetic mean, `0.0` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (one degree of freedom), `0.0` with fewer than two values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Sample standard deviation.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Least-squares slope of `values` against their index.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(values);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs.iter().zip(values) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Pearson correlation coefficient; `0.0` when either series is constant
/// or the lengths differ.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let mut covariance = 0.0;
    let mut x_ss = 0.0;
    let mut y_ss = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - x_mean) * (y - y_mean);
        x_ss += (x - x_mean).powi(2);
        y_ss += (y - y_mean).powi(2);
    }
    let denominator = (x_ss * y_ss).sqrt();
    if denominator > 0.0 {
        covariance / denominator
    } else {
        0.0
    }
}

/// Trailing moving average with a minimum of one period, so the output has
/// the same length as the input.
#[must_use]
pub fn moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    (0..values.len())
        .map(|i| mean(&values[i.saturating_sub(period - 1)..=i]))
        .collect()
}

/// Mean period-over-period fractional change.
///
/// Changes from a non-positive previous value are undefined and skipped.
/// Returns `0.0` when no change is defined.
#[must_use]
pub fn mean_pct_change(values: &[f64]) -> f64 {
    let changes: Vec<f64> = values
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    mean(&changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(close(mean(&[]), 0.0));
        assert!(close(mean(&[2.0, 4.0]), 3.0));
    }

    #[test]
    fn variance_needs_two_values() {
        assert!(close(sample_variance(&[5.0]), 0.0));
        assert!(close(sample_variance(&[1.0, 2.0, 3.0, 4.0]), 5.0 / 3.0));
        assert!(close(sample_std(&[2.0, 4.0]), 2.0_f64.sqrt()));
    }

    #[test]
    fn slope_of_line() {
        assert!(close(slope(&[1.0, 3.0, 5.0, 7.0]), 2.0));
        assert!(close(slope(&[4.0]), 0.0));
        assert!(close(slope(&[9.0, 9.0, 9.0]), 0.0));
    }

    #[test]
    fn pearson_extremes() {
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0));
        assert!(close(pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]), -1.0));
        assert!(close(pearson(&[1.0, 1.0, 1.0], &[6.0, 4.0, 2.0]), 0.0));
        assert!(close(pearson(&[1.0, 2.0], &[1.0]), 0.0));
    }

    #[test]
    fn moving_average_uses_partial_windows() {
        let ma = moving_average(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(ma.len(), 4);
        assert!(close(ma[0], 2.0));
        assert!(close(ma[1], 3.0));
        assert!(close(ma[2], 4.0));
        assert!(close(ma[3], 6.0));
    }

    #[test]
    fn moving_average_period_zero_acts_as_one() {
        assert_eq!(moving_average(&[1.0, 5.0], 0), vec![1.0, 5.0]);
    }

    #[test]
    fn pct_change_mean() {
        // 100 -> 110 (+10%), 110 -> 99 (-10%)
        assert!(close(mean_pct_change(&[100.0, 110.0, 99.0]), 0.0));
        assert!(close(mean_pct_change(&[10.0, 20.0]), 1.0));
    }

    #[test]
    fn pct_change_undefined_is_zero() {
        assert!(close(mean_pct_change(&[]), 0.0));
        assert!(close(mean_pct_change(&[7.0]), 0.0));
        assert!(close(mean_pct_change(&[0.0, 0.0, 0.0]), 0.0));
    }

    #[test]
    fn pct_change_skips_zero_bases() {
        // 0 -> 5 is undefined; 5 -> 10 is +100%.
        assert!(close(mean_pct_change(&[0.0, 5.0, 10.0]), 1.0));
    }
}
