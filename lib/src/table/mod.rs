//! In-memory tabular data.
//!
//! A [`RecordTable`] is an ordered set of named [`Column`]s that all share the
//! same row count. It is produced by the CSV and Parquet decoders, filtered and
//! extended in place by the feature preparer, and read by the label encoding
//! stage.
//!
//! # Example
//!
//! ```rust
//! use diabetes_model::table::{Column, RecordTable, Value};
//!
//! let table = RecordTable::from_columns(vec![
//!     Column::new("Age", vec![Value::Int(3), Value::Int(13)]),
//!     Column::new("BMI", vec![Value::Float(24.5), Value::Float(31.0)]),
//! ])
//! .unwrap();
//! assert_eq!(table.n_rows(), 2);
//! assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Age", "BMI"]);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod csv;
pub mod parquet;
pub mod prediction;

pub use self::prediction::PredictionTable;

/// Errors raised while building or decoding a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A single cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Id(Uuid),
}

impl Value {
    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Id(_) => 3,
        }
    }

    /// Total order used when sorting categories.
    ///
    /// Null sorts first, then numbers (ints and floats compared by value),
    /// then text, then row identifiers.
    pub fn category_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Id(a), Value::Id(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Id(v) => write!(f, "{}", v),
        }
    }
}

/// A named column of cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of equally long, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    columns: Vec<Column>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, checking that names are unique and lengths agree.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        if self.column(column.name()).is_some() {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(TableError::LengthMismatch {
                    column: column.name,
                    expected: first.len(),
                    got: column.values.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name, returning it if it existed.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`RecordTable::column`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<&Column, TableError> {
        self.column(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Keep the rows whose mask entry is `true`, preserving their order.
    ///
    /// # Panics
    /// Panics if `keep.len()` differs from the row count.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        assert_eq!(keep.len(), self.n_rows(), "row mask length mismatch");
        for column in &mut self.columns {
            let mut mask = keep.iter();
            column.values.retain(|_| *mask.next().unwrap_or(&false));
        }
    }
}
