//! Linear regression with compile-time state tracking:
//! - [`LinearRegression`] = `LinearModel<Unfitted>`, produced by the
//!   [`Trainer`](crate::trainer::Trainer) while solving;
//! - [`LinearModel<Fitted>`], the inference-only, serializable predictor.
//!
//! The fitted model is free from training settings: it holds only the
//! coefficients and the intercept.

use super::{Fitted, InferenceModel, ModelError, Unfitted};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Learned parameters: one coefficient per feature plus an intercept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearParams {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            coefficients: vec![0.0; n_features],
            intercept: 0.0,
        }
    }
}

/// A linear model with state encoded at the type level.
///
/// `predict` is only available on `LinearModel<Fitted>`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

/// Alias for an **unfitted** linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl LinearRegression {
    /// Zero-initialized model for `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    /// Constructs a model from explicit parameters (e.g., solver output).
    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn update_params(&mut self, params: LinearParams) {
        self.params = params;
    }

    pub fn into_fitted(self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params)
    }
}

impl<S> LinearModel<S> {
    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.params.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }
}

impl LinearModel<Fitted> {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

/// Inference for a trained linear model: `y = w^T x + b`.
impl InferenceModel for LinearModel<Fitted> {
    type ParamsRepr = LinearParams;

    fn n_features(&self) -> usize {
        self.params.coefficients.len()
    }

    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        if input.len() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: input.len(),
            });
        }
        let weights = ArrayView1::from(self.params.coefficients.as_slice());
        Ok(input.dot(&weights) + self.params.intercept)
    }

    fn predict_batch(&self, input: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if input.ncols() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: input.ncols(),
            });
        }
        let weights = ArrayView1::from(self.params.coefficients.as_slice());
        Ok(input.dot(&weights) + self.params.intercept)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        self.params.clone()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError> {
        Ok(Self::new(params))
    }
}
