//! Object storage for persisted embedding tables.
//!
//! Wraps an `object_store` backend (local filesystem, S3, or in-memory) behind
//! string keys and maps backend errors onto `LookalikeError`.

use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use tracing::{debug, instrument};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{LookalikeError, Result};

/// Cheaply cloneable handle to the configured object store.
#[derive(Clone)]
pub struct LookalikeStore {
    inner: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for LookalikeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookalikeStore")
            .field("backend", &self.inner.to_string())
            .finish()
    }
}

impl LookalikeStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// An empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    /// Build the backend described by `config`.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match config.backend {
            StorageBackend::Memory => Arc::new(InMemory::new()),
            StorageBackend::Local => {
                std::fs::create_dir_all(&config.root)?;
                Arc::new(LocalFileSystem::new_with_prefix(&config.root)?)
            }
            StorageBackend::S3 => {
                let bucket = config.bucket.as_deref().ok_or_else(|| {
                    LookalikeError::Config("storage.bucket is required for the s3 backend".into())
                })?;
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_region(&config.region);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                Arc::new(builder.build()?)
            }
        };

        debug!(backend = %config.backend, "initialized object store");
        Ok(Self::new(inner))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = Path::parse(key)?;
        let result = self.inner.get(&path).await.map_err(|e| map_not_found(e, key))?;
        let data = result.bytes().await.map_err(|e| map_not_found(e, key))?;
        debug!(bytes = data.len(), "read object");
        Ok(data)
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = Path::parse(key)?;
        self.inner.put(&path, PutPayload::from(data)).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = Path::parse(key)?;
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = Path::parse(key)?;
        self.inner
            .delete(&path)
            .await
            .map_err(|e| map_not_found(e, key))
    }
}

fn map_not_found(e: object_store::Error, key: &str) -> LookalikeError {
    match e {
        object_store::Error::NotFound { .. } => LookalikeError::NotFound {
            key: key.to_string(),
        },
        other => LookalikeError::Storage(other),
    }
}
