//! Statistical helpers shared by the profiler, the outlier clamp and the
//! correlation heatmap.

/// Quantile of already-sorted values using linear interpolation between
/// the two nearest ranks.
///
/// Returns `None` for an empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Collect the finite values of a column and sort them ascending.
pub(crate) fn sorted_finite(values: &[Option<f64>]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Tukey fence `[Q1 - k*IQR, Q3 + k*IQR]` for a column.
///
/// Returns `None` when the column has no finite values.
pub(crate) fn tukey_fence(values: &[Option<f64>], multiplier: f64) -> Option<(f64, f64)> {
    let sorted = sorted_finite(values);
    let q1 = quantile_sorted(&sorted, 0.25)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let iqr = q3 - q1;

    Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
}

/// Arithmetic mean.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = mean(values)?;
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Pearson correlation over the rows where both values are present.
///
/// Returns `None` for fewer than two complete pairs or zero variance.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // pos = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(3.25));
    }

    #[test]
    fn test_quantile_single_and_empty() {
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    // ==================== tukey_fence tests ====================

    #[test]
    fn test_tukey_fence_basic() {
        let values: Vec<Option<f64>> = (1..=9).map(|v| Some(v as f64)).collect();
        // Q1 = 3, Q3 = 7, IQR = 4 -> [-3, 13]
        assert_eq!(tukey_fence(&values, 1.5), Some((-3.0, 13.0)));
    }

    #[test]
    fn test_tukey_fence_ignores_nulls() {
        let values = vec![Some(1.0), None, Some(1.0), Some(1.0)];
        assert_eq!(tukey_fence(&values, 1.5), Some((1.0, 1.0)));
        assert_eq!(tukey_fence(&[None, None], 1.5), None);
    }

    // ==================== std tests ====================

    #[test]
    fn test_sample_std() {
        // Values: 1..5, mean 3, variance 10/4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[5.0]), None);
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0)];
        let y = vec![Some(2.0), Some(4.0), Some(6.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let neg = vec![Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&x, &neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_pairwise_complete() {
        let x = vec![Some(1.0), Some(2.0), None, Some(3.0)];
        let y = vec![Some(1.0), Some(2.0), Some(100.0), Some(3.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        let x = vec![Some(1.0), Some(1.0), Some(1.0)];
        let y = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&x, &y), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }
}
