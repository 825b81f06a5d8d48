//! Closed-form least-squares training.
//!
//! [`Trainer::fit`] centres the design matrix and the target, forms the
//! normal equations `XᵀX β = Xᵀy`, and solves them with a Cholesky
//! factorisation that skips linearly dependent columns. Skipped columns get a
//! zero coefficient, so rank-deficient designs (duplicated or constant
//! columns) still yield a valid least-squares solution. The intercept is
//! recovered from the means: `b = ȳ - x̄·β`.

use crate::model::{Fitted, LinearModel, LinearParams, LinearRegression, ModelError};
use crate::preprocessing::FeatureMatrix;
use ndarray::{Array1, Array2, Axis};
use tracing::debug;

/// Ordinary least squares with intercept.
///
/// Deterministic; no regularization.
///
/// # Example
/// ```rust
/// use diabetes_model::preprocessing::LabelEncoding;
/// use diabetes_model::table::{Column, RecordTable, Value};
/// use diabetes_model::trainer::Trainer;
///
/// let table = RecordTable::from_columns(vec![
///     Column::new("y", (0..5).map(|x| Value::Float(2.0 * x as f64 + 1.0)).collect()),
///     Column::new("x", (0..5).map(Value::Int).collect()),
/// ])
/// .unwrap();
/// let encoding = LabelEncoding::new("y");
/// let (x, _) = encoding.fit_transform(&table).unwrap();
/// let y = encoding.target_vector(&table).unwrap();
///
/// let model = Trainer::new().fit(&x, &y).unwrap();
/// assert!((model.coefficients()[0] - 2.0).abs() < 1e-9);
/// assert!((model.intercept() - 1.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trainer {
    tolerance: f64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self { tolerance: 1e-10 }
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative pivot threshold below which a column counts as linearly
    /// dependent on the columns before it.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fit on an encoded feature matrix.
    pub fn fit(
        &self,
        features: &FeatureMatrix,
        target: &[f64],
    ) -> Result<LinearModel<Fitted>, ModelError> {
        self.fit_array(&features.to_f64(), target)
    }

    /// Fit on a raw `(n_rows, n_features)` design matrix.
    pub fn fit_array(
        &self,
        x: &Array2<f64>,
        target: &[f64],
    ) -> Result<LinearModel<Fitted>, ModelError> {
        let (n_rows, n_features) = x.dim();
        if n_rows != target.len() {
            return Err(ModelError::ShapeMismatch {
                rows: n_rows,
                targets: target.len(),
            });
        }
        if n_rows == 0 {
            return Err(ModelError::EmptyData(
                "Cannot fit a model on zero rows".to_string(),
            ));
        }

        let y = Array1::from(target.to_vec());
        let x_mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.sum() / n_rows as f64;

        let xc = x - &x_mean;
        let yc = &y - y_mean;
        let gram = xc.t().dot(&xc);
        let moment = xc.t().dot(&yc);

        let coefficients = self.solve_normal_equations(&gram, &moment);
        let intercept = y_mean - x_mean.dot(&coefficients);

        let mut model = LinearRegression::new(n_features);
        model.update_params(LinearParams {
            coefficients: coefficients.to_vec(),
            intercept,
        });
        Ok(model.into_fitted())
    }

    /// Solve `G β = m` for symmetric positive semi-definite `G`.
    fn solve_normal_equations(&self, gram: &Array2<f64>, moment: &Array1<f64>) -> Array1<f64> {
        let p = gram.nrows();
        let mut lower = Array2::<f64>::zeros((p, p));
        let mut active = vec![false; p];

        for j in 0..p {
            let diag = gram[[j, j]];
            let residual = diag - (0..j).map(|k| lower[[j, k]].powi(2)).sum::<f64>();
            if diag <= 0.0 || residual <= self.tolerance * diag {
                continue;
            }
            active[j] = true;
            let pivot = residual.sqrt();
            lower[[j, j]] = pivot;
            for i in (j + 1)..p {
                let dot: f64 = (0..j).map(|k| lower[[i, k]] * lower[[j, k]]).sum();
                lower[[i, j]] = (gram[[i, j]] - dot) / pivot;
            }
        }

        let dropped = active.iter().filter(|a| !**a).count();
        if dropped > 0 {
            debug!(dropped, "Skipped linearly dependent columns");
        }

        // L z = m
        let mut z = Array1::<f64>::zeros(p);
        for j in (0..p).filter(|&j| active[j]) {
            let dot: f64 = (0..j).map(|k| lower[[j, k]] * z[k]).sum();
            z[j] = (moment[j] - dot) / lower[[j, j]];
        }

        // Lᵀ β = z
        let mut beta = Array1::<f64>::zeros(p);
        for j in (0..p).rev().filter(|&j| active[j]) {
            let dot: f64 = ((j + 1)..p).map(|i| lower[[i, j]] * beta[i]).sum();
            beta[j] = (z[j] - dot) / lower[[j, j]];
        }
        beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceModel;
    use ndarray::array;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-8,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_fit_simple_line() {
        // y = 2x + 1
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let model = Trainer::new().fit_array(&x, &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_close(model.coefficients()[0], 2.0);
        assert_close(model.intercept(), 1.0);
    }

    #[test]
    fn test_fit_two_features() {
        // y = x1 + 3 x2 + 0.5
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 1.0], [1.0, 3.0]];
        let y: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|r| r[0] + 3.0 * r[1] + 0.5)
            .collect();
        let model = Trainer::new().fit_array(&x, &y).unwrap();
        assert_close(model.coefficients()[0], 1.0);
        assert_close(model.coefficients()[1], 3.0);
        assert_close(model.intercept(), 0.5);

        let pred = model.predict_batch(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert_close(*p, *t);
        }
    }

    #[test]
    fn test_fit_duplicated_column_gets_zero_weight() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let model = Trainer::new().fit_array(&x, &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_close(model.coefficients()[0], 2.0);
        assert_eq!(model.coefficients()[1], 0.0);
        assert_close(model.intercept(), 1.0);
    }

    #[test]
    fn test_fit_constant_column() {
        let x = array![[5.0, 0.0], [5.0, 1.0], [5.0, 2.0]];
        let model = Trainer::new().fit_array(&x, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(model.coefficients()[0], 0.0);
        assert_close(model.coefficients()[1], 1.0);
        assert_close(model.intercept(), 1.0);
    }

    #[test]
    fn test_fit_single_row_predicts_target() {
        let x = array![[4.0, 2.0]];
        let model = Trainer::new().fit_array(&x, &[1.5]).unwrap();
        assert_eq!(model.coefficients(), &[0.0, 0.0]);
        assert_close(model.intercept(), 1.5);
    }

    #[test]
    fn test_fit_shape_mismatch() {
        let x = array![[0.0], [1.0]];
        assert_eq!(
            Trainer::new().fit_array(&x, &[1.0]).unwrap_err(),
            ModelError::ShapeMismatch { rows: 2, targets: 1 }
        );
    }

    #[test]
    fn test_fit_empty() {
        let x = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            Trainer::new().fit_array(&x, &[]),
            Err(ModelError::EmptyData(_))
        ));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 1.0]];
        let y = [0.3, 1.7, 2.2, 4.9];
        let a = Trainer::new().fit_array(&x, &y).unwrap();
        let b = Trainer::new().fit_array(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}
