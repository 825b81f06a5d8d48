//! Categorical feature encoding.
//!
//! ## LabelEncoder
//! Maps the distinct values of one column to integer codes (0, 1, 2, ...),
//! in sorted category order.
//!
//! ```ignore
//! // Input:  [Int(10), Int(5), Int(10)]
//! // Output: [1, 0, 1]
//! ```
//!
//! ## LabelEncoding
//! Applies an independent [`LabelEncoder`] to every predictor column of a
//! [`RecordTable`](crate::table::RecordTable) and keeps one fitted mapping per
//! column in [`ColumnEncoders`].

mod columns;
mod label;

pub use columns::{ColumnEncoders, FeatureMatrix, LabelEncoding};
pub use label::{FittedLabelEncoder, LabelEncoder};
