//! Object storage for submission payloads.
//!
//! Files live in an S3-compatible bucket; the database only holds their
//! public URLs. The `FileStore` trait keeps the storage backend swappable so
//! tests run against an in-memory store.

use crate::config::Config;
use crate::errors::ApiError;
use bytes::Bytes;
use common::secret::ExposeSecret;
use minio::s3::builders::{ObjectContent, ObjectToDelete};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use minio::s3::types::S3Api;
use minio::s3::{Client, ClientBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::{debug, error, info};

/// Storage abstraction for submission payloads.
///
/// `put` returns the public URL under which the stored object is reachable.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<String, ApiError>;

    async fn delete(&self, key: &str) -> Result<(), ApiError>;
}

/// S3-compatible file store.
#[derive(Clone)]
pub struct S3FileStore {
    client: Arc<Client>,
    bucket: String,
    public_base_url: String,
}

impl S3FileStore {
    /// Connect to the configured endpoint and verify the bucket exists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ServiceUnavailable` when the endpoint cannot be
    /// reached or the bucket is missing, so startup fails fast instead of
    /// failing on the first upload.
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        let provider = Box::new(StaticProvider::new(
            &config.storage_access_key,
            config.storage_secret_key.expose_secret(),
            None,
        ));

        let base_url: BaseUrl = config.storage_endpoint.parse().map_err(|e| {
            error!(target: "meet.storage", error = ?e, "Invalid storage endpoint URL");
            ApiError::Internal
        })?;

        let client = ClientBuilder::new(base_url)
            .provider(Some(provider))
            .build()
            .map_err(|e| {
                error!(target: "meet.storage", error = ?e, "Failed to build storage client");
                ApiError::Internal
            })?;

        let exists = client
            .bucket_exists(&config.storage_bucket)
            .send()
            .await
            .map_err(|e| {
                error!(target: "meet.storage", error = ?e, "Failed to reach object storage");
                ApiError::ServiceUnavailable("Object storage is unavailable".to_string())
            })?;

        if !exists.exists {
            error!(
                target: "meet.storage",
                bucket = %config.storage_bucket,
                "Configured storage bucket does not exist"
            );
            return Err(ApiError::ServiceUnavailable(
                "Storage bucket does not exist".to_string(),
            ));
        }

        info!(target: "meet.storage", bucket = %config.storage_bucket, "Connected to object storage");

        Ok(Self {
            client: Arc::new(client),
            bucket: config.storage_bucket.clone(),
            public_base_url: config.storage_public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl FileStore for S3FileStore {
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<String, ApiError> {
        let content = ObjectContent::from(data);

        let response = self
            .client
            .put_object_content(&self.bucket, key, content)
            .content_type(content_type.to_string())
            .send()
            .await
            .map_err(|e| {
                error!(target: "meet.storage", error = ?e, key, "Failed to store object");
                ApiError::ServiceUnavailable("Object storage is unavailable".to_string())
            })?;

        debug!(target: "meet.storage", object = %response.object, "Stored object");

        Ok(format!("{}/{}/{}", self.public_base_url, self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        self.client
            .delete_object(&self.bucket, ObjectToDelete::from(key))
            .send()
            .await
            .map_err(|e| {
                error!(target: "meet.storage", error = ?e, key, "Failed to delete object");
                ApiError::ServiceUnavailable("Object storage is unavailable".to_string())
            })?;

        Ok(())
    }
}

/// In-memory file store for tests.
///
/// Keyed object map behind a mutex; `put` URLs use a fixed fake base so
/// assertions can match on them.
#[derive(Default)]
pub struct MemoryFileStore {
    objects: Mutex<HashMap<String, (String, Bytes)>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type and payload for a stored key, if present.
    pub fn get(&self, key: &str) -> Option<(String, Bytes)> {
        self.objects.lock().ok()?.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<String, ApiError> {
        let mut objects = self.objects.lock().map_err(|_| ApiError::Internal)?;
        objects.insert(key.to_string(), (content_type.to_string(), data));
        Ok(format!("memory://submissions/{}", key))
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        let mut objects = self.objects.lock().map_err(|_| ApiError::Internal)?;
        objects.remove(key);
        Ok(())
    }
}
