//! Data preprocessing for the diabetes survey.
//!
//! Preparation runs in two stages:
//!
//! - [`FeaturePreparer`]: drops out-of-range rows and attaches row identifiers
//!   (mutates the table in place);
//! - [`LabelEncoding`]: turns the remaining predictor columns into an integer
//!   [`FeatureMatrix`], keeping the fitted [`ColumnEncoders`] for persistence.
//!
//! # Example
//!
//! ```rust
//! use diabetes_model::preprocessing::{FeaturePreparer, LabelEncoding};
//! use diabetes_model::table::{Column, RecordTable, Value};
//!
//! let mut table = RecordTable::from_columns(vec![
//!     Column::new("Diabetes_012", vec![Value::Int(0), Value::Int(2), Value::Int(1)]),
//!     Column::new("Age", vec![Value::Int(4), Value::Int(13), Value::Int(9)]),
//! ])
//! .unwrap();
//!
//! let preparer = FeaturePreparer::default();
//! preparer.prepare(&mut table).unwrap();
//!
//! let encoding = LabelEncoding::new("Diabetes_012").skip(preparer.id_column());
//! let (x, _encoders) = encoding.fit_transform(&table).unwrap();
//! assert_eq!(x.n_rows(), 2);
//! assert_eq!(x.feature_names(), &["Age".to_string()]);
//! ```

pub mod encoding;
pub mod error;
pub mod prepare;

pub use encoding::{ColumnEncoders, FeatureMatrix, FittedLabelEncoder, LabelEncoder, LabelEncoding};
pub use error::PreprocessingError;
pub use prepare::FeaturePreparer;
