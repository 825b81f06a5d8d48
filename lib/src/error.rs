//! Top-level error type returned by the pipelines.

use crate::model::ModelError;
use crate::preprocessing::PreprocessingError;
use crate::serialization::ArtifactKind;
use crate::storage::{DataFormat, StorageError};
use crate::table::TableError;
use crate::tracking::TrackingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown data format '{format}' for path {path}")]
    UnknownFormat { path: String, format: DataFormat },

    #[error("No artifact could be loaded from {path}")]
    MissingArtifact { path: String },

    #[error("Expected a {expected} at {path}, found a {found}")]
    UnexpectedArtifact {
        path: String,
        expected: ArtifactKind,
        found: ArtifactKind,
    },

    #[error("Write to {path} was skipped")]
    WriteSkipped { path: String },

    #[error("Model rmse {rmse} is not below the registration threshold {threshold}")]
    MetricGate { rmse: f64, threshold: f64 },

    #[error("Artifact encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Compression error on {path}: {source}")]
    Compression {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),
}
