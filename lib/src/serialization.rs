//! Serialization of persisted artifacts.
//!
//! Everything the pipelines persist is wrapped in a tagged [`Artifact`], so a
//! reader can tell what it loaded before using it. The binary encoding is
//! bincode, provided through [`SerializableParams`].

use crate::model::ModelBundle;
use crate::table::{PredictionTable, RecordTable};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// A trait for values that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Kind tag of an [`Artifact`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    FeatureTable,
    ModelBundle,
    PredictionTable,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::FeatureTable => "feature table",
            ArtifactKind::ModelBundle => "model bundle",
            ArtifactKind::PredictionTable => "prediction table",
        };
        f.write_str(name)
    }
}

/// Anything the pipelines read or write as a single object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    FeatureTable(RecordTable),
    ModelBundle(ModelBundle),
    PredictionTable(PredictionTable),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::FeatureTable(_) => ArtifactKind::FeatureTable,
            Artifact::ModelBundle(_) => ArtifactKind::ModelBundle,
            Artifact::PredictionTable(_) => ArtifactKind::PredictionTable,
        }
    }

    /// Tabular view of the artifact, if it has one.
    pub fn to_record_table(&self) -> Option<RecordTable> {
        match self {
            Artifact::FeatureTable(table) => Some(table.clone()),
            Artifact::PredictionTable(predictions) => Some(predictions.to_record_table()),
            Artifact::ModelBundle(_) => None,
        }
    }

    pub fn into_model_bundle(self) -> Option<ModelBundle> {
        match self {
            Artifact::ModelBundle(bundle) => Some(bundle),
            _ => None,
        }
    }
}
