//! Helper functions for statistical operations
//!
//! Common summaries over plain `f64` slices.

/// Calculate sum of numbers
pub fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().sum()
}

/// Calculate mean of numbers, `None` for an empty slice
pub fn mean(numbers: &[f64]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    Some(sum(numbers) / numbers.len() as f64)
}

/// Sum of squared deviations from the mean
pub fn sum_sq_dev(numbers: &[f64]) -> f64 {
    match mean(numbers) {
        Some(m) => numbers.iter().map(|x| (x - m) * (x - m)).sum(),
        None => 0.0,
    }
}

/// Pearson correlation coefficient
///
/// `None` when fewer than two pairs are given, the lengths differ, or either
/// sequence is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut sum_xy_dev = 0.0;
    let mut sum_xx_dev = 0.0;
    let mut sum_yy_dev = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dev_x = xi - mean_x;
        let dev_y = yi - mean_y;
        sum_xy_dev += dev_x * dev_y;
        sum_xx_dev += dev_x * dev_x;
        sum_yy_dev += dev_y * dev_y;
    }

    let denom = (sum_xx_dev * sum_yy_dev).sqrt();
    if !(denom > 0.0) || !denom.is_finite() {
        return None;
    }

    Some((sum_xy_dev / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), Some(4.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sum_sq_dev() {
        assert!((sum_sq_dev(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        // numpy.corrcoef([1, 2, 3, 4], [1, 3, 2, 4])[0, 1] == 0.8
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }
}
