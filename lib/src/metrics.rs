//! Regression metrics.

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error: `mean((y_true - y_pred)^2)`.
    ///
    /// Returns 0.0 for empty input.
    ///
    /// # Panics
    /// Panics if the slices differ in length.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        sum_sq / y_true.len() as f64
    }

    /// Root Mean Squared Error, in the same units as the target.
    ///
    /// The validation pipeline gates model registration on this value.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mse_perfect() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(Metrics::mse(&y, &y), 0.0);
    }

    #[test]
    fn test_rmse() {
        // errors 1, -1, 3 -> mse 11/3
        let rmse = Metrics::rmse(&[1.0, 2.0, 3.0], &[0.0, 3.0, 0.0]);
        assert!((rmse - (11.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(Metrics::rmse(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "Arrays must have the same length")]
    fn test_length_mismatch_panics() {
        Metrics::mse(&[1.0], &[1.0, 2.0]);
    }
}
