//! Column-wise label encoding of a record table into a feature matrix.

use super::label::{FittedLabelEncoder, LabelEncoder};
use crate::preprocessing::error::PreprocessingError;
use crate::table::RecordTable;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Integer-encoded predictor columns, row-major `(n_rows, n_features)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    feature_names: Vec<String>,
    codes: Array2<i64>,
}

impl FeatureMatrix {
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn codes(&self) -> &Array2<i64> {
        &self.codes
    }

    pub fn n_rows(&self) -> usize {
        self.codes.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.codes.ncols()
    }

    /// Codes as floating point, ready for the solver.
    pub fn to_f64(&self) -> Array2<f64> {
        self.codes.mapv(|code| code as f64)
    }

    fn from_columns(feature_names: Vec<String>, columns: Vec<Vec<i64>>, n_rows: usize) -> Self {
        let codes = Array2::from_shape_fn((n_rows, columns.len()), |(row, col)| columns[col][row]);
        Self {
            feature_names,
            codes,
        }
    }
}

/// One fitted mapping per encoded column, in feature order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnEncoders {
    encoders: Vec<(String, FittedLabelEncoder)>,
}

impl ColumnEncoders {
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.encoders.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&FittedLabelEncoder> {
        self.encoders
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, encoder)| encoder)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Encode `table` with the stored mappings.
    ///
    /// Every encoded column must be present; values unseen during fit are an
    /// error.
    pub fn transform(&self, table: &RecordTable) -> Result<FeatureMatrix, PreprocessingError> {
        let mut columns = Vec::with_capacity(self.encoders.len());
        for (name, encoder) in &self.encoders {
            let column = table.require_column(name)?;
            let codes = encoder
                .transform(column.values())
                .map_err(|err| with_column(err, name))?;
            columns.push(codes);
        }
        let names = self.feature_names().map(str::to_string).collect();
        Ok(FeatureMatrix::from_columns(names, columns, table.n_rows()))
    }
}

fn with_column(err: PreprocessingError, name: &str) -> PreprocessingError {
    match err {
        PreprocessingError::UnknownCategory { value, .. } => PreprocessingError::UnknownCategory {
            column: name.to_string(),
            value,
        },
        other => other,
    }
}

/// Label encoding stage: every column except the target (and any skipped
/// columns) is fitted and encoded independently.
///
/// # Example
/// ```rust
/// use diabetes_model::preprocessing::LabelEncoding;
/// use diabetes_model::table::{Column, RecordTable, Value};
///
/// let table = RecordTable::from_columns(vec![
///     Column::new("Diabetes_012", vec![Value::Int(0), Value::Int(2)]),
///     Column::new("BMI", vec![Value::Int(40), Value::Int(22)]),
/// ])
/// .unwrap();
///
/// let (x, encoders) = LabelEncoding::new("Diabetes_012").fit_transform(&table).unwrap();
/// assert_eq!(x.feature_names(), &["BMI".to_string()]);
/// assert_eq!(x.codes().column(0).to_vec(), vec![1, 0]);
/// assert_eq!(encoders.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct LabelEncoding {
    target: String,
    skipped: Vec<String>,
}

impl LabelEncoding {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            skipped: Vec::new(),
        }
    }

    /// Leave `column` out of the feature matrix.
    pub fn skip(mut self, column: impl Into<String>) -> Self {
        self.skipped.push(column.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn is_feature(&self, column: &str) -> bool {
        column != self.target && !self.skipped.iter().any(|s| s == column)
    }

    pub fn fit_transform(
        &self,
        table: &RecordTable,
    ) -> Result<(FeatureMatrix, ColumnEncoders), PreprocessingError> {
        table.require_column(&self.target)?;
        if table.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot encode a table without rows".to_string(),
            ));
        }

        let encoder = LabelEncoder::new();
        let mut names = Vec::new();
        let mut columns = Vec::new();
        let mut encoders = Vec::new();
        for column in table.columns().iter().filter(|c| self.is_feature(c.name())) {
            let (fitted, codes) = encoder.fit_transform(column.values())?;
            names.push(column.name().to_string());
            columns.push(codes);
            encoders.push((column.name().to_string(), fitted));
        }

        let matrix = FeatureMatrix::from_columns(names, columns, table.n_rows());
        Ok((matrix, ColumnEncoders { encoders }))
    }

    /// Target column as a numeric vector.
    pub fn target_vector(&self, table: &RecordTable) -> Result<Vec<f64>, PreprocessingError> {
        let column = table.require_column(&self.target)?;
        column
            .values()
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .as_f64()
                    .ok_or_else(|| PreprocessingError::NonNumericTarget {
                        column: self.target.clone(),
                        row,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, TableError, Value};

    fn survey() -> RecordTable {
        RecordTable::from_columns(vec![
            Column::new(
                "Diabetes_012",
                vec![Value::Int(0), Value::Int(2), Value::Int(1)],
            ),
            Column::new("Age", vec![Value::Int(9), Value::Int(3), Value::Int(9)]),
            Column::new(
                "Sex",
                vec![
                    Value::Text("f".into()),
                    Value::Text("m".into()),
                    Value::Text("f".into()),
                ],
            ),
            Column::new(
                "uuid",
                vec![Value::Text("c".into()), Value::Text("a".into()), Value::Text("b".into())],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_encodes_every_non_target_column() {
        let (x, encoders) = LabelEncoding::new("Diabetes_012")
            .fit_transform(&survey())
            .unwrap();

        assert_eq!(x.feature_names(), &["Age", "Sex", "uuid"]);
        assert_eq!(x.codes().shape(), &[3, 3]);
        assert_eq!(x.codes().column(0).to_vec(), vec![1, 0, 1]);
        assert_eq!(x.codes().column(1).to_vec(), vec![0, 1, 0]);
        assert_eq!(x.codes().column(2).to_vec(), vec![2, 0, 1]);
        assert_eq!(encoders.len(), 3);
    }

    #[test]
    fn test_keeps_one_mapping_per_column() {
        let (_, encoders) = LabelEncoding::new("Diabetes_012")
            .fit_transform(&survey())
            .unwrap();

        let age = encoders.get("Age").unwrap();
        assert_eq!(age.classes(), &[Value::Int(3), Value::Int(9)]);
        let sex = encoders.get("Sex").unwrap();
        assert_eq!(
            sex.inverse_transform(&[1]).unwrap(),
            vec![Value::Text("m".into())]
        );
    }

    #[test]
    fn test_skip_excludes_column() {
        let (x, encoders) = LabelEncoding::new("Diabetes_012")
            .skip("uuid")
            .fit_transform(&survey())
            .unwrap();
        assert_eq!(x.feature_names(), &["Age", "Sex"]);
        assert!(encoders.get("uuid").is_none());
    }

    #[test]
    fn test_missing_target_is_error() {
        let err = LabelEncoding::new("HeartDisease")
            .fit_transform(&survey())
            .unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::Table(TableError::ColumnNotFound(name)) if name == "HeartDisease"
        ));
    }

    #[test]
    fn test_transform_reuses_stored_mappings() {
        let encoding = LabelEncoding::new("Diabetes_012").skip("uuid");
        let (fitted_x, encoders) = encoding.fit_transform(&survey()).unwrap();
        assert_eq!(encoders.transform(&survey()).unwrap(), fitted_x);

        let unseen = RecordTable::from_columns(vec![
            Column::new("Age", vec![Value::Int(4)]),
            Column::new("Sex", vec![Value::Text("f".into())]),
        ])
        .unwrap();
        assert!(matches!(
            encoders.transform(&unseen),
            Err(PreprocessingError::UnknownCategory { column, .. }) if column == "Age"
        ));
    }

    #[test]
    fn test_target_vector() {
        let encoding = LabelEncoding::new("Diabetes_012");
        assert_eq!(encoding.target_vector(&survey()).unwrap(), vec![0.0, 2.0, 1.0]);

        let bad = RecordTable::from_columns(vec![Column::new(
            "Diabetes_012",
            vec![Value::Int(1), Value::Null],
        )])
        .unwrap();
        assert!(matches!(
            encoding.target_vector(&bad),
            Err(PreprocessingError::NonNumericTarget { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_table_is_error() {
        let empty = RecordTable::from_columns(vec![
            Column::new("Diabetes_012", vec![]),
            Column::new("Age", vec![]),
        ])
        .unwrap();
        assert!(matches!(
            LabelEncoding::new("Diabetes_012").fit_transform(&empty),
            Err(PreprocessingError::EmptyData(_))
        ));
    }
}
