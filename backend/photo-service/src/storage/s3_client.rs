// S3-compatible client (AWS S3, DigitalOcean Spaces, MinIO)

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::Credentials, error::DisplayErrorContext, primitives::ByteStream,
    types::ObjectCannedAcl, Client,
};
use tracing::{debug, error, info};

use super::{BlobStore, StorageError};
use crate::config::ObjectStoreConfig;

pub struct S3BlobStore {
    client: Client,
    config: ObjectStoreConfig,
}

impl S3BlobStore {
    pub async fn new(config: ObjectStoreConfig) -> Self {
        info!(
            "Initializing S3 client for bucket {} at {}",
            config.bucket, config.hostname
        );

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "photo-service",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            client: Client::new(&sdk_config),
            config,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError> {
        debug!("Uploading {} to S3 as {} ({} bytes)", path.display(), key, content_length);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Upload(format!("Failed to read {}: {}", path.display(), e)))?;
        let content_length = i64::try_from(content_length)
            .map_err(|_| StorageError::Upload(format!("Object too large: {} bytes", content_length)))?;

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(body)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .content_length(content_length)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!("S3 upload failed for {}: {}", key, message);
                StorageError::Upload(message)
            })?;

        info!("File uploaded successfully: {}", key);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        debug!("Deleting {} from S3", key);

        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(DisplayErrorContext(&e).to_string()))?;

        info!("File deleted successfully: {}", key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
