//! Regression models with compile-time training state.

pub mod bundle;
pub mod linear;
pub mod state;

pub use bundle::ModelBundle;
pub use linear::{LinearModel, LinearParams, LinearRegression};
pub use state::{Fitted, Unfitted};

use ndarray::{Array1, Array2, ArrayView1};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors raised while fitting or applying a model.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Feature matrix has {rows} rows but target has {targets} values")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Feature names differ: model has {expected:?}, input has {got:?}")]
    FeatureNames {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

/// A trained model that maps feature rows to predictions.
pub trait InferenceModel {
    /// Plain-data representation of the learned parameters.
    type ParamsRepr: Serialize + DeserializeOwned;

    fn n_features(&self) -> usize;

    /// Predict a single sample.
    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64, ModelError>;

    /// Predict every row of `input`.
    fn predict_batch(&self, input: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> Result<Self, ModelError>
    where
        Self: Sized;
}
