//! Numeric kernels used by the summary, outlier and correlation code.
//!
//! Everything here works on plain slices; missing values have already been
//! dropped (or are carried as `None` for row-aligned pairwise work).

use crate::types::ColumnStatistics;

/// Arithmetic mean, or `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1). `None` when fewer than 2 values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Copy and sort ascending.
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Percentile of already-sorted values, `q` in `[0, 1]`.
///
/// Linear interpolation between closest ranks at position `q * (n - 1)`.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Descriptive statistics over the present values of a column.
pub(crate) fn column_statistics(values: &[f64]) -> ColumnStatistics {
    let sorted = sorted(values);

    ColumnStatistics {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min: sorted.first().copied(),
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Pearson correlation over rows where both values are present.
///
/// NaN when fewer than 2 shared rows exist or either side has zero variance.
pub(crate) fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== mean / std tests ====================

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_std_basic() {
        // Values: 1..=5, variance = 10 / 4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_needs_two_values() {
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_sample_std_identical_values() {
        assert_eq!(sample_std(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    // ==================== percentile tests ====================

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.25), Some(1.75));
        assert_eq!(percentile(&values, 0.5), Some(2.5));
        assert_eq!(percentile(&values, 0.75), Some(3.25));
    }

    #[test]
    fn test_percentile_exact_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0, 1000.0];
        assert_eq!(percentile(&values, 0.25), Some(2.0));
        assert_eq!(percentile(&values, 0.75), Some(4.0));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(1000.0));
    }

    #[test]
    fn test_percentile_single_and_empty() {
        assert_eq!(percentile(&[7.0], 0.25), Some(7.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    // ==================== column_statistics tests ====================

    #[test]
    fn test_column_statistics_scenario() {
        let stats = column_statistics(&[5.0, 1.0, 3.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.std, Some(2.0));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.p25, Some(2.0));
        assert_eq!(stats.p50, Some(3.0));
        assert_eq!(stats.p75, Some(4.0));
        assert_eq!(stats.max, Some(5.0));
    }

    #[test]
    fn test_column_statistics_empty() {
        let stats = column_statistics(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = [Some(1.0), Some(2.0), Some(3.0)];
        let ys = [Some(2.0), Some(4.0), Some(6.0)];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);

        let neg = [Some(6.0), Some(4.0), Some(2.0)];
        assert!((pearson(&xs, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pairwise_complete() {
        let xs = [Some(1.0), None, Some(3.0), Some(4.0)];
        let ys = [Some(1.0), Some(100.0), Some(3.0), Some(4.0)];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_is_nan() {
        let xs = [Some(1.0), Some(1.0), Some(1.0)];
        let ys = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson(&xs, &ys).is_nan());

        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
    }
}
