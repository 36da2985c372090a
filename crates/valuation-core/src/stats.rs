//! Descriptive statistics over short financial histories.
//!
//! Histories here are a handful of fiscal years, so every helper degrades to
//! 0.0 instead of NaN when the sample is too small to say anything.

use statrs::statistics::Statistics;

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().mean()
}

/// Compute population standard deviation (divides by n, not n - 1).
pub fn population_std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.iter().population_std_dev()
}

/// Coefficient of variation: population std-dev over the mean.
/// Returns 0.0 for fewer than two samples or a non-positive mean.
pub fn coefficient_of_variation(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    if m <= 0.0 {
        return 0.0;
    }
    population_std_dev(data) / m
}

/// Compound annual growth rate between `oldest` and `newest` over `years`.
pub fn cagr(newest: f64, oldest: f64, years: usize) -> f64 {
    if oldest <= 0.0 || years == 0 {
        return 0.0;
    }
    (newest / oldest).powf(1.0 / years as f64) - 1.0
}

/// True if any two adjacent values straddle zero (one strictly positive,
/// the next strictly negative, in either order). Zeros never count.
pub fn has_sign_change(data: &[f64]) -> bool {
    data.windows(2)
        .any(|w| (w[0] > 0.0 && w[1] < 0.0) || (w[0] < 0.0 && w[1] > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[100.0, 200.0, 300.0]), 200.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        // [116, 100]: mean 108, deviations +/-8
        assert_relative_eq!(population_std_dev(&[116.0, 100.0]), 8.0, epsilon = 1e-9);
        assert_eq!(population_std_dev(&[42.0]), 0.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        let cv = coefficient_of_variation(&[150.0, 50.0]);
        assert_relative_eq!(cv, 0.5, epsilon = 1e-9);
        assert_eq!(coefficient_of_variation(&[150.0]), 0.0);
    }

    #[test]
    fn test_cagr() {
        assert_relative_eq!(cagr(116.0, 100.0, 1), 0.16, epsilon = 1e-9);
        assert_relative_eq!(cagr(121.0, 100.0, 2), 0.10, epsilon = 1e-9);
        assert_eq!(cagr(121.0, 0.0, 2), 0.0);
        assert_eq!(cagr(121.0, 100.0, 0), 0.0);
    }

    #[test]
    fn test_sign_change() {
        assert!(has_sign_change(&[10.0, -5.0, 8.0]));
        assert!(has_sign_change(&[-1.0, 1.0]));
        assert!(!has_sign_change(&[10.0, 0.0, -5.0]));
        assert!(!has_sign_change(&[10.0, 12.0, 9.0]));
        assert!(!has_sign_change(&[]));
    }
}
