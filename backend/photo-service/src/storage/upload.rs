//! Spooling of uploaded images to the local temp directory.
//!
//! The temp file lives exactly as long as its [`TempUpload`]: it is removed on
//! [`TempUpload::discard`] or, failing that, when the value is dropped. A
//! request therefore never leaves a file behind, whichever way it ends.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large. Maximum size is {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Empty file provided")]
    Empty,

    #[error("Temp file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Object key for an upload: `<unix-millis>-<uuid>.<ext>`, the extension
/// taken from the MIME subtype (`image/png` -> `png`)
pub fn generate_filename(mimetype: &str) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension_for(mimetype)
    )
}

fn extension_for(mimetype: &str) -> String {
    let essence = mimetype.split(';').next().unwrap_or_default();
    let subtype = essence.rsplit('/').next().unwrap_or_default();
    let extension: String = subtype
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '-' || *c == '.')
        .collect();

    if extension.is_empty() {
        "bin".to_string()
    } else {
        extension
    }
}

/// An upload being written to disk chunk by chunk
pub struct SpoolingUpload {
    temp: NamedTempFile,
    writer: tokio::fs::File,
    mimetype: String,
    size: u64,
    max_bytes: u64,
}

impl SpoolingUpload {
    /// Start spooling an `image/*` upload into `dir`
    pub fn create(dir: &Path, mimetype: &str, max_bytes: u64) -> Result<Self, UploadError> {
        let mimetype = mimetype.trim().to_ascii_lowercase();
        if !mimetype.starts_with("image/") {
            return Err(UploadError::UnsupportedType(mimetype));
        }

        let temp = tempfile::Builder::new().prefix("upload-").tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(temp.reopen()?);
        debug!("Spooling upload to {}", temp.path().display());

        Ok(Self {
            temp,
            writer,
            mimetype,
            size: 0,
            max_bytes,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.size += chunk.len() as u64;
        if self.size > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        self.writer.write_all(chunk).await?;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<TempUpload, UploadError> {
        if self.size == 0 {
            return Err(UploadError::Empty);
        }

        self.writer.flush().await?;
        self.writer.sync_all().await?;

        Ok(TempUpload {
            generated_filename: generate_filename(&self.mimetype),
            temp: self.temp,
            mimetype: self.mimetype,
            size: self.size,
        })
    }
}

/// A fully received upload waiting in the temp directory
#[derive(Debug)]
pub struct TempUpload {
    temp: NamedTempFile,
    pub mimetype: String,
    pub size: u64,
    pub generated_filename: String,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Remove the temp file, logging instead of failing
    pub fn discard(self) {
        let path: PathBuf = self.temp.path().to_path_buf();
        match self.temp.close() {
            Ok(()) => debug!("Removed temp file {}", path.display()),
            Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
        }
    }
}
