//! Byte-level access to the local filesystem and S3-compatible object storage.

use super::{Location, ObjectLocation, StorageError};
use crate::config::StorageConfig;
use crate::runtime;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Reads and writes whole payloads at resolved [`Location`]s.
///
/// Object-store clients are built per operation from [`StorageConfig`]
/// unless a store was injected with [`Storage::with_object_store`], in which
/// case every bucket maps onto that store.
#[derive(Clone, Debug)]
pub struct Storage {
    config: StorageConfig,
    object_store: Option<Arc<dyn ObjectStore>>,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            object_store: None,
        }
    }

    /// Route all remote operations to `store` (useful for testing).
    pub fn with_object_store(config: StorageConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            object_store: Some(store),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Fetch the full payload stored at `location`.
    pub fn get(&self, location: &Location) -> Result<Vec<u8>, StorageError> {
        match location {
            Location::Local(path) => fs::read(path).map_err(|source| StorageError::Io {
                path: path.display().to_string(),
                source,
            }),
            Location::Remote(object) => {
                let store = self.remote_store(&object.bucket)?;
                let path = ObjectPath::from(object.key.as_str());
                debug!(bucket = %object.bucket, key = %object.key, "Fetching object");
                let bytes = runtime::block_on(async { store.get(&path).await?.bytes().await })
                    .map_err(StorageError::Runtime)??;
                Ok(bytes.to_vec())
            }
        }
    }

    /// Store `payload` at `location`, replacing any existing content.
    ///
    /// Local parent directories are created as needed.
    pub fn put(&self, location: &Location, payload: Vec<u8>) -> Result<(), StorageError> {
        match location {
            Location::Local(path) => write_local(path, &payload),
            Location::Remote(object) => self.put_remote(object, payload),
        }
    }

    fn put_remote(&self, object: &ObjectLocation, payload: Vec<u8>) -> Result<(), StorageError> {
        let store = self.remote_store(&object.bucket)?;
        let path = ObjectPath::from(object.key.as_str());
        debug!(bucket = %object.bucket, key = %object.key, bytes = payload.len(), "Uploading object");
        runtime::block_on(store.put(&path, PutPayload::from(payload)))
            .map_err(StorageError::Runtime)??;
        Ok(())
    }

    fn remote_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        if let Some(store) = &self.object_store {
            return Ok(Arc::clone(store));
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(endpoint) = &self.config.endpoint_url {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        if let Some(region) = &self.config.region {
            builder = builder.with_region(region);
        }
        Ok(Arc::new(builder.build()?))
    }
}

fn write_local(path: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, payload).map_err(io_err)
}
