use super::{gzip, DataStore};
use crate::error::{PipelineError, Result};
use crate::serialization::{Artifact, SerializableParams};
use crate::storage::{is_compressed, DataFormat, Location, StorageError};
use crate::table::csv::encode_csv;
use crate::table::parquet::encode_parquet;
use tracing::{error, info, warn};

/// Result of [`DataStore::save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The payload was stored; `bytes` is its size after compression.
    Written { bytes: usize },
    /// The destination could not be resolved and nothing was written.
    Skipped,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

impl DataStore {
    /// Persist `artifact` at `path`, replacing any existing content.
    ///
    /// A malformed `s3://` path is reported and the write is skipped.
    pub fn save(&self, artifact: &Artifact, path: &str) -> Result<WriteOutcome> {
        let location = match Location::parse(path) {
            Ok(location) => location,
            Err(err @ StorageError::MalformedPath(_)) => {
                error!(path, "{}", err);
                return Ok(WriteOutcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        };

        let mut payload = encode(artifact, path)?;
        if is_compressed(path) {
            payload = gzip(path, &payload)?;
        }
        let bytes = payload.len();
        self.storage.put(&location, payload)?;

        info!(
            path,
            storage = location.kind().as_str(),
            kind = %artifact.kind(),
            bytes,
            "Saved artifact"
        );
        Ok(WriteOutcome::Written { bytes })
    }
}

fn encode(artifact: &Artifact, path: &str) -> Result<Vec<u8>> {
    let format = DataFormat::of(path);
    if matches!(format, DataFormat::Csv | DataFormat::Parquet) {
        match artifact.to_record_table() {
            Some(table) if format == DataFormat::Csv => {
                let mut buffer = Vec::new();
                encode_csv(&table, &mut buffer)?;
                return Ok(buffer);
            }
            Some(table) => return Ok(encode_parquet(&table)?),
            None => warn!(
                path,
                kind = %artifact.kind(),
                "Artifact has no tabular form, writing binary"
            ),
        }
    }
    artifact.to_bytes().map_err(PipelineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::Storage;
    use crate::table::{Column, PredictionTable, RecordTable, Value};
    use object_store::memory::InMemory;
    use std::fs;
    use std::sync::Arc;
    use uuid::Uuid;

    fn features() -> RecordTable {
        RecordTable::from_columns(vec![
            Column::new("Age", vec![Value::Int(3), Value::Int(7)]),
            Column::new("BMI", vec![Value::Float(22.5), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_save_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/features.pickle");
        let path = path.to_str().unwrap();
        let store = DataStore::new(StorageConfig::default());

        let first = store
            .save(&Artifact::FeatureTable(RecordTable::new()), path)
            .unwrap();
        assert!(first.is_written());
        store.save(&Artifact::FeatureTable(features()), path).unwrap();

        let loaded = store.read_artifact(path).unwrap().unwrap();
        assert_eq!(loaded, Artifact::FeatureTable(features()));
    }

    #[test]
    fn test_save_csv_destination_is_readable_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let path = path.to_str().unwrap();
        let store = DataStore::new(StorageConfig::default());

        store.save(&Artifact::FeatureTable(features()), path).unwrap();

        assert!(fs::read_to_string(path).unwrap().starts_with("Age,BMI"));
        assert_eq!(store.read_table(path).unwrap(), features());
    }

    #[test]
    fn test_save_gzipped_parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.parquet.gz");
        let path = path.to_str().unwrap();
        let store = DataStore::new(StorageConfig::default());

        let outcome = store.save(&Artifact::FeatureTable(features()), path).unwrap();

        let raw = fs::read(path).unwrap();
        assert_eq!(outcome, WriteOutcome::Written { bytes: raw.len() });
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(store.read_table(path).unwrap(), features());
    }

    #[test]
    fn test_save_prediction_table_to_object_store() {
        let storage =
            Storage::with_object_store(StorageConfig::default(), Arc::new(InMemory::new()));
        let store = DataStore::with_storage(storage);
        let predictions = PredictionTable::new(vec![Uuid::new_v4()], vec![1.5]);
        let artifact = Artifact::PredictionTable(predictions);

        store.save(&artifact, "s3://out/prediction.pickle").unwrap();
        let loaded = store.read_artifact("s3://out/prediction.pickle").unwrap();
        assert_eq!(loaded, Some(artifact));
    }

    #[test]
    fn test_save_malformed_remote_path_is_skipped() {
        let store = DataStore::new(StorageConfig::default());
        let outcome = store
            .save(&Artifact::FeatureTable(features()), "s3://no-key")
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
    }
}
