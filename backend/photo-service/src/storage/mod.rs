// Storage module for S3-compatible object storage and upload spooling

pub mod s3_client;
pub mod upload;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use s3_client::S3BlobStore;
pub use upload::{SpoolingUpload, TempUpload, UploadError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Delete error: {0}")]
    Delete(String),

    #[error("Bucket unavailable: {0}")]
    Unavailable(String),
}

/// Object storage for uploaded images
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the file at `path` under `key` with a public-read ACL
    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL a stored object is served from
    fn public_url(&self, key: &str) -> String;

    async fn health_check(&self) -> Result<(), StorageError>;
}
