use super::{gunzip, DataStore};
use crate::error::{PipelineError, Result};
use crate::serialization::{Artifact, SerializableParams};
use crate::storage::{DataFormat, Location, StorageError};
use crate::table::csv::decode_csv;
use crate::table::parquet::decode_parquet;
use crate::table::RecordTable;
use bytes::Bytes;
use tracing::{error, info};

impl DataStore {
    /// Load a CSV or Parquet table.
    ///
    /// Any other format is an [`PipelineError::UnknownFormat`] error, as is
    /// a malformed `s3://` path.
    pub fn read_table(&self, path: &str) -> Result<RecordTable> {
        let format = DataFormat::of(path);
        if !matches!(format, DataFormat::Csv | DataFormat::Parquet) {
            return Err(PipelineError::UnknownFormat {
                path: path.to_string(),
                format,
            });
        }

        let location = Location::parse(path)?;
        let payload = gunzip(path, self.storage.get(&location)?)?;
        let table = match format {
            DataFormat::Csv => decode_csv(payload.as_slice())?,
            _ => decode_parquet(Bytes::from(payload))?,
        };

        info!(
            path,
            storage = location.kind().as_str(),
            %format,
            rows = table.n_rows(),
            columns = table.n_columns(),
            "Read table"
        );
        Ok(table)
    }

    /// Load a binary artifact.
    ///
    /// A malformed `s3://` path is reported and yields `Ok(None)`; the caller
    /// decides whether absence is fatal.
    pub fn read_artifact(&self, path: &str) -> Result<Option<Artifact>> {
        let format = DataFormat::of(path);
        if format != DataFormat::Binary {
            return Err(PipelineError::UnknownFormat {
                path: path.to_string(),
                format,
            });
        }

        let location = match Location::parse(path) {
            Ok(location) => location,
            Err(err @ StorageError::MalformedPath(_)) => {
                error!(path, "{}", err);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let payload = gunzip(path, self.storage.get(&location)?)?;
        let artifact = Artifact::from_bytes(&payload)?;
        info!(
            path,
            storage = location.kind().as_str(),
            kind = %artifact.kind(),
            "Read artifact"
        );
        Ok(Some(artifact))
    }
}
