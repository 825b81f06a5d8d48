//! The unit of persistence between training and validation.

use super::{Fitted, InferenceModel, LinearModel, LinearParams, ModelError};
use crate::preprocessing::{ColumnEncoders, FeatureMatrix};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fitted model parameters together with the feature layout and the column
/// encoders they were trained against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    params: LinearParams,
    feature_names: Vec<String>,
    encoders: ColumnEncoders,
}

impl ModelBundle {
    pub fn new(
        model: &LinearModel<Fitted>,
        feature_names: Vec<String>,
        encoders: ColumnEncoders,
    ) -> Self {
        Self {
            params: model.extract_params(),
            feature_names,
            encoders,
        }
    }

    pub fn model(&self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params.clone())
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn encoders(&self) -> &ColumnEncoders {
        &self.encoders
    }

    /// Predict every row of `features`.
    ///
    /// The matrix must carry the same feature names, in the same order, as
    /// the training matrix.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Array1<f64>, ModelError> {
        if features.feature_names() != self.feature_names.as_slice() {
            return Err(ModelError::FeatureNames {
                expected: self.feature_names.clone(),
                got: features.feature_names().to_vec(),
            });
        }
        self.model().predict_batch(&features.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::LabelEncoding;
    use crate::table::{Column, RecordTable, Value};

    fn table(ages: &[i64], bmis: &[i64]) -> RecordTable {
        RecordTable::from_columns(vec![
            Column::new("Diabetes_012", ages.iter().map(|_| Value::Int(0)).collect()),
            Column::new("Age", ages.iter().copied().map(Value::Int).collect()),
            Column::new("BMI", bmis.iter().copied().map(Value::Int).collect()),
        ])
        .unwrap()
    }

    fn bundle() -> (ModelBundle, FeatureMatrix) {
        let (x, encoders) = LabelEncoding::new("Diabetes_012")
            .fit_transform(&table(&[1, 2, 3], &[20, 30, 20]))
            .unwrap();
        let model = LinearModel::<Fitted>::new(LinearParams {
            coefficients: vec![1.0, 10.0],
            intercept: 0.5,
        });
        (ModelBundle::new(&model, x.feature_names().to_vec(), encoders), x)
    }

    #[test]
    fn test_predict_with_matching_features() {
        let (bundle, x) = bundle();
        // Age codes [0, 1, 2], BMI codes [0, 1, 0]
        assert_eq!(bundle.predict(&x).unwrap().to_vec(), vec![0.5, 11.5, 2.5]);
    }

    #[test]
    fn test_predict_rejects_different_layout() {
        let (bundle, _) = bundle();
        let (other, _) = LabelEncoding::new("Diabetes_012")
            .skip("BMI")
            .fit_transform(&table(&[1, 2], &[20, 30]))
            .unwrap();
        assert!(matches!(
            bundle.predict(&other),
            Err(ModelError::FeatureNames { .. })
        ));
    }

    #[test]
    fn test_bincode_round_trip_is_exact() {
        let (bundle, _) = bundle();
        let bytes = bincode::serialize(&bundle).unwrap();
        let restored: ModelBundle = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, bundle);
        assert_eq!(restored.intercept().to_bits(), 0.5f64.to_bits());
        assert_eq!(restored.encoders().len(), 2);
    }
}
