//! Storage and format resolution for data paths.
//!
//! Every path handed to the pipeline is classified twice:
//! - by **backend** ([`StorageKind`]): `s3://bucket/key` paths live in object
//!   storage, everything else on the local filesystem;
//! - by **encoding** ([`DataFormat`]): derived from the file extension after
//!   stripping one optional `.gz` compression suffix.
//!
//! Both classifications are pure and never fail; an [`DataFormat::Unknown`]
//! result is the caller's problem.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod backend;

pub use self::backend::Storage;

/// URI prefix that selects the object-store backend.
pub const OBJECT_STORE_SCHEME: &str = "s3://";

/// Optional compression suffix tolerated after the format extension.
pub const COMPRESSION_SUFFIX: &str = ".gz";

/// Errors raised by the storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Incorrect S3 path: {0}")]
    MalformedPath(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Where a path's bytes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    ObjectStore,
}

impl StorageKind {
    pub fn of(path: &str) -> Self {
        if path.starts_with(OBJECT_STORE_SCHEME) {
            StorageKind::ObjectStore
        } else {
            StorageKind::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Local => "local",
            StorageKind::ObjectStore => "s3",
        }
    }
}

/// How a path's bytes are encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Parquet,
    Binary,
    Unknown,
}

impl DataFormat {
    pub fn of(path: &str) -> Self {
        let stem = path.strip_suffix(COMPRESSION_SUFFIX).unwrap_or(path);
        if stem.ends_with(".parquet") {
            DataFormat::Parquet
        } else if stem.ends_with(".csv") {
            DataFormat::Csv
        } else if stem.ends_with(".pickle") {
            DataFormat::Binary
        } else {
            DataFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Parquet => "parquet",
            DataFormat::Binary => "pickle",
            DataFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a path carries the compression suffix.
pub fn is_compressed(path: &str) -> bool {
    path.ends_with(COMPRESSION_SUFFIX)
}

/// Bucket and key of an object-store path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Split `s3://bucket/some/key` into its bucket and key.
    ///
    /// Returns `None` when the scheme is missing or the bucket or key segment
    /// is empty.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(OBJECT_STORE_SCHEME)?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", OBJECT_STORE_SCHEME, self.bucket, self.key)
    }
}

/// A resolved storage location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(ObjectLocation),
}

impl Location {
    pub fn parse(path: &str) -> Result<Self, StorageError> {
        match StorageKind::of(path) {
            StorageKind::Local => Ok(Location::Local(PathBuf::from(path))),
            StorageKind::ObjectStore => ObjectLocation::parse(path)
                .map(Location::Remote)
                .ok_or_else(|| StorageError::MalformedPath(path.to_string())),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Location::Local(_) => StorageKind::Local,
            Location::Remote(_) => StorageKind::ObjectStore,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote(object) => object.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type() {
        assert_eq!(StorageKind::of("s3://bucket/object"), StorageKind::ObjectStore);
        assert_eq!(StorageKind::of("local/file"), StorageKind::Local);
        assert_eq!(StorageKind::of("/abs/s3://nested"), StorageKind::Local);
        assert_eq!(StorageKind::of("S3://bucket/object"), StorageKind::Local);
    }

    #[test]
    fn test_data_type() {
        assert_eq!(DataFormat::of("path/to/file.parquet.gz"), DataFormat::Parquet);
        assert_eq!(DataFormat::of("path/to/file.parquet"), DataFormat::Parquet);
        assert_eq!(DataFormat::of("path/to/file.csv"), DataFormat::Csv);
        assert_eq!(DataFormat::of("path/to/file.csv.gz"), DataFormat::Csv);
        assert_eq!(DataFormat::of("path/to/file.pickle.gz"), DataFormat::Binary);
        assert_eq!(DataFormat::of("path/to/file"), DataFormat::Unknown);
        assert_eq!(DataFormat::of("path/to/file.gz"), DataFormat::Unknown);
        assert_eq!(DataFormat::of("path/to/file.csv.gz.gz"), DataFormat::Unknown);
    }

    #[test]
    fn test_object_location_parse() {
        assert_eq!(
            ObjectLocation::parse("s3://bucket/dir/model.pickle"),
            Some(ObjectLocation {
                bucket: "bucket".into(),
                key: "dir/model.pickle".into(),
            })
        );
        assert_eq!(ObjectLocation::parse("s3://bucket"), None);
        assert_eq!(ObjectLocation::parse("s3://bucket/"), None);
        assert_eq!(ObjectLocation::parse("s3:///key"), None);
        assert_eq!(ObjectLocation::parse("bucket/key"), None);
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            Location::parse("data/train.csv").unwrap(),
            Location::Local(PathBuf::from("data/train.csv"))
        );
        assert_eq!(
            Location::parse("s3://b/k.csv").unwrap().kind(),
            StorageKind::ObjectStore
        );
        assert!(matches!(
            Location::parse("s3://only-bucket"),
            Err(StorageError::MalformedPath(p)) if p == "s3://only-bucket"
        ));
    }

    #[test]
    fn test_location_display_round_trips() {
        let location = Location::parse("s3://b/dir/k.pickle").unwrap();
        assert_eq!(location.to_string(), "s3://b/dir/k.pickle");
    }
}
