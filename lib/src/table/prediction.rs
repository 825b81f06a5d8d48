//! Predictions joined back to their source rows.

use super::{Column, RecordTable, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row identifier + predicted value, one entry per validated row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionTable {
    pub row_ids: Vec<Uuid>,
    pub predictions: Vec<f64>,
}

impl PredictionTable {
    pub const ID_COLUMN: &'static str = "uuid";
    pub const PREDICTION_COLUMN: &'static str = "prediction";

    /// # Panics
    /// Panics if the two vectors have different lengths.
    pub fn new(row_ids: Vec<Uuid>, predictions: Vec<f64>) -> Self {
        assert_eq!(
            row_ids.len(),
            predictions.len(),
            "every prediction needs a row identifier"
        );
        Self {
            row_ids,
            predictions,
        }
    }

    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }

    /// Two-column view (`uuid`, `prediction`) for CSV/Parquet output.
    pub fn to_record_table(&self) -> RecordTable {
        let ids = self.row_ids.iter().copied().map(Value::Id).collect();
        let predictions = self.predictions.iter().copied().map(Value::Float).collect();
        RecordTable {
            columns: vec![
                Column::new(Self::ID_COLUMN, ids),
                Column::new(Self::PREDICTION_COLUMN, predictions),
            ],
        }
    }
}
