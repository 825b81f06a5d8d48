//! Label encoding for a single column.
//!
//! Maps each distinct value to its index among the sorted distinct values
//! (0, 1, 2, ...).

use crate::preprocessing::error::PreprocessingError;
use crate::table::Value;
use serde::{Deserialize, Serialize};

/// Label encoder for one column of cells.
///
/// Classes are sorted with [`Value::category_cmp`], so integer categories keep
/// their natural order and text categories sort lexicographically.
///
/// # Example
/// ```rust
/// use diabetes_model::preprocessing::LabelEncoder;
/// use diabetes_model::table::Value;
///
/// let values = vec![Value::Int(10), Value::Int(5), Value::Int(10)];
/// let fitted = LabelEncoder::new().fit(&values).unwrap();
/// assert_eq!(fitted.transform(&values).unwrap(), vec![1, 0, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Fit the encoder to the values and return the fitted encoder.
    pub fn fit(&self, values: &[Value]) -> Result<FittedLabelEncoder, PreprocessingError> {
        if values.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit LabelEncoder on empty data".to_string(),
            ));
        }

        let mut classes = values.to_vec();
        classes.sort_by(|a, b| a.category_cmp(b));
        classes.dedup_by(|a, b| a.category_cmp(b).is_eq());

        Ok(FittedLabelEncoder { classes })
    }

    /// Fit and transform in one step.
    pub fn fit_transform(
        &self,
        values: &[Value],
    ) -> Result<(FittedLabelEncoder, Vec<i64>), PreprocessingError> {
        let fitted = self.fit(values)?;
        let codes = fitted.transform(values)?;
        Ok((fitted, codes))
    }
}

/// Fitted label encoder: the sorted distinct classes of one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLabelEncoder {
    classes: Vec<Value>,
}

impl FittedLabelEncoder {
    pub fn classes(&self) -> &[Value] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code of a single value, if it was seen during fit.
    pub fn code_of(&self, value: &Value) -> Option<i64> {
        self.classes
            .binary_search_by(|class| class.category_cmp(value))
            .ok()
            .map(|idx| idx as i64)
    }

    /// Transform values to their class indices.
    pub fn transform(&self, values: &[Value]) -> Result<Vec<i64>, PreprocessingError> {
        values
            .iter()
            .map(|value| {
                self.code_of(value)
                    .ok_or_else(|| PreprocessingError::UnknownCategory {
                        column: String::new(),
                        value: value.to_string(),
                    })
            })
            .collect()
    }

    /// Map class indices back to the original values.
    pub fn inverse_transform(&self, codes: &[i64]) -> Result<Vec<Value>, PreprocessingError> {
        codes
            .iter()
            .map(|&code| {
                usize::try_from(code)
                    .ok()
                    .and_then(|idx| self.classes.get(idx))
                    .cloned()
                    .ok_or(PreprocessingError::CodeOutOfBounds {
                        code,
                        n_classes: self.classes.len(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    #[test]
    fn test_label_encoder_basic() {
        let labels = ints(&[2, 0, 1, 0]);
        let fitted = LabelEncoder::new().fit(&labels).unwrap();

        assert_eq!(fitted.n_classes(), 3);
        assert_eq!(fitted.classes(), ints(&[0, 1, 2]).as_slice());
        assert_eq!(fitted.transform(&labels).unwrap(), vec![2, 0, 1, 0]);
    }

    #[test]
    fn test_label_encoder_non_contiguous() {
        let labels = ints(&[10, 5, 0]);
        let (fitted, codes) = LabelEncoder::new().fit_transform(&labels).unwrap();

        assert_eq!(fitted.classes(), ints(&[0, 5, 10]).as_slice());
        assert_eq!(codes, vec![2, 1, 0]);
    }

    #[test]
    fn test_label_encoder_text_and_null() {
        let labels = vec![
            Value::Text("male".into()),
            Value::Null,
            Value::Text("female".into()),
        ];
        let (fitted, codes) = LabelEncoder::new().fit_transform(&labels).unwrap();
        assert_eq!(codes, vec![2, 0, 1]);
        assert_eq!(fitted.code_of(&Value::Text("female".into())), Some(1));
    }

    #[test]
    fn test_label_encoder_float_collapses_with_int() {
        let labels = vec![Value::Float(1.0), Value::Int(1), Value::Float(0.5)];
        let (fitted, codes) = LabelEncoder::new().fit_transform(&labels).unwrap();
        assert_eq!(fitted.n_classes(), 2);
        assert_eq!(codes, vec![1, 1, 0]);
    }

    #[test]
    fn test_label_encoder_inverse() {
        let labels = ints(&[2, 0, 1, 0]);
        let (fitted, codes) = LabelEncoder::new().fit_transform(&labels).unwrap();
        assert_eq!(fitted.inverse_transform(&codes).unwrap(), labels);
    }

    #[test]
    fn test_label_encoder_inverse_out_of_bounds() {
        let fitted = LabelEncoder::new().fit(&ints(&[0, 1])).unwrap();
        assert!(matches!(
            fitted.inverse_transform(&[2]),
            Err(PreprocessingError::CodeOutOfBounds { code: 2, n_classes: 2 })
        ));
        assert!(fitted.inverse_transform(&[-1]).is_err());
    }

    #[test]
    fn test_label_encoder_unknown_error() {
        let fitted = LabelEncoder::new().fit(&ints(&[0, 1])).unwrap();
        assert!(matches!(
            fitted.transform(&ints(&[2])),
            Err(PreprocessingError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_label_encoder_empty_data() {
        assert!(matches!(
            LabelEncoder::new().fit(&[]),
            Err(PreprocessingError::EmptyData(_))
        ));
    }

    #[test]
    fn test_label_encoder_serialization() {
        let fitted = LabelEncoder::new().fit(&ints(&[3, 1, 2])).unwrap();
        let bytes = bincode::serialize(&fitted).unwrap();
        let loaded: FittedLabelEncoder = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded, fitted);
    }
}
