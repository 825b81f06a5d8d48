//! Error types for preprocessing operations.

use crate::table::TableError;
use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A value was not seen when the encoder was fitted.
    #[error("Unknown category in column '{column}': {value}")]
    UnknownCategory { column: String, value: String },

    /// An encoded index has no class to map back to.
    #[error("Code {code} out of bounds for {n_classes} classes")]
    CodeOutOfBounds { code: i64, n_classes: usize },

    /// Target cell that cannot be used as a regression target.
    #[error("Target column '{column}' has non-numeric value at row {row}")]
    NonNumericTarget { column: String, row: usize },

    /// Feature set differs from the one seen during fit.
    #[error("Feature mismatch: expected {expected:?}, got {got:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_empty_data() {
        let err = PreprocessingError::EmptyData("no rows".to_string());
        assert!(err.to_string().contains("Empty data"));
    }

    #[test]
    fn test_error_display_unknown_category() {
        let err = PreprocessingError::UnknownCategory {
            column: "Sex".to_string(),
            value: "3".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown category in column 'Sex': 3");
    }

    #[test]
    fn test_error_display_non_numeric_target() {
        let err = PreprocessingError::NonNumericTarget {
            column: "Diabetes_012".to_string(),
            row: 4,
        };
        assert!(err.to_string().contains("row 4"));
    }

    #[test]
    fn test_error_from_table_error() {
        let err: PreprocessingError = TableError::ColumnNotFound("Age".to_string()).into();
        assert_eq!(err.to_string(), "Column not found: Age");
    }
}
