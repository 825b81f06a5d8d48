//! Row-level preparation applied before encoding.
//!
//! Two steps, always in this order:
//! 1. drop rows whose ordinal outlier column falls outside the kept range;
//! 2. attach a fresh identifier to every surviving row.

use crate::config::PipelineConfig;
use crate::preprocessing::error::PreprocessingError;
use crate::table::{Column, RecordTable, Value};
use tracing::debug;
use uuid::Uuid;

/// Outlier filter plus row identifier assignment.
///
/// # Example
/// ```rust
/// use diabetes_model::preprocessing::FeaturePreparer;
/// use diabetes_model::table::{Column, RecordTable, Value};
///
/// let mut table = RecordTable::from_columns(vec![Column::new(
///     "Age",
///     vec![Value::Int(0), Value::Int(5), Value::Int(13)],
/// )])
/// .unwrap();
///
/// let kept = FeaturePreparer::new("Age", 1.0, 12.0, "uuid")
///     .prepare(&mut table)
///     .unwrap();
/// assert_eq!(kept, 1);
/// assert!(table.column("uuid").is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturePreparer {
    outlier_column: String,
    min: f64,
    max: f64,
    id_column: String,
}

impl FeaturePreparer {
    pub fn new(
        outlier_column: impl Into<String>,
        min: f64,
        max: f64,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            outlier_column: outlier_column.into(),
            min,
            max,
            id_column: id_column.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.outlier_column.clone(),
            config.outlier_min,
            config.outlier_max,
            config.id_column.clone(),
        )
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    fn in_range(&self, value: &Value) -> bool {
        value
            .as_f64()
            .map(|v| v >= self.min && v <= self.max)
            .unwrap_or(false)
    }

    /// Keep rows whose outlier column is numeric and inside `[min, max]`.
    ///
    /// Returns the number of dropped rows.
    pub fn drop_outliers(&self, table: &mut RecordTable) -> Result<usize, PreprocessingError> {
        let keep: Vec<bool> = table
            .require_column(&self.outlier_column)?
            .values()
            .iter()
            .map(|value| self.in_range(value))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        table.retain_rows(&keep);
        debug!(column = %self.outlier_column, dropped, "Dropped outlier rows");
        Ok(dropped)
    }

    /// Attach one fresh v4 identifier per row, replacing any existing column
    /// of the same name.
    pub fn assign_row_ids(&self, table: &mut RecordTable) -> Result<(), PreprocessingError> {
        let ids = (0..table.n_rows())
            .map(|_| Value::Id(Uuid::new_v4()))
            .collect();
        table.remove_column(&self.id_column);
        table.push_column(Column::new(self.id_column.clone(), ids))?;
        Ok(())
    }

    /// Filter, then assign identifiers. Returns the number of kept rows.
    pub fn prepare(&self, table: &mut RecordTable) -> Result<usize, PreprocessingError> {
        self.drop_outliers(table)?;
        self.assign_row_ids(table)?;
        Ok(table.n_rows())
    }
}

impl Default for FeaturePreparer {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
