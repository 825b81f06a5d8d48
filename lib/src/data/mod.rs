//! Reading and writing pipeline data at storage-agnostic paths.
//!
//! A [`DataStore`] resolves every path with the [`storage`](crate::storage)
//! resolver, fetches or stores the full payload through the matching backend,
//! and encodes or decodes it according to the path's format:
//!
//! | Format | Read as | Written as |
//! |---|---|---|
//! | `.csv` | [`RecordTable`](crate::table::RecordTable) | CSV (tables only) |
//! | `.parquet` | [`RecordTable`](crate::table::RecordTable) | Parquet (tables only) |
//! | `.pickle` | [`Artifact`](crate::serialization::Artifact) | bincode |
//! | other | error | bincode |
//!
//! A trailing `.gz` gzips the payload on write. On read, any payload that
//! starts with the gzip magic bytes is decompressed first.

mod reader;
mod writer;

pub use writer::WriteOutcome;

use crate::config::StorageConfig;
use crate::error::{PipelineError, Result};
use crate::storage::Storage;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader and writer over local and object storage.
#[derive(Clone, Debug)]
pub struct DataStore {
    storage: Storage,
}

impl DataStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            storage: Storage::new(config),
        }
    }

    pub fn with_storage(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

fn is_gzip(payload: &[u8]) -> bool {
    payload.starts_with(&GZIP_MAGIC)
}

fn gunzip(path: &str, payload: Vec<u8>) -> Result<Vec<u8>> {
    if !is_gzip(&payload) {
        return Ok(payload);
    }
    let mut decoder = GzDecoder::new(payload.as_slice());
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|source| PipelineError::Compression {
            path: path.to_string(),
            source,
        })?;
    Ok(decompressed)
}

fn gzip(path: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let compression_err = |source| PipelineError::Compression {
        path: path.to_string(),
        source,
    };
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).map_err(compression_err)?;
    encoder.finish().map_err(compression_err)
}
