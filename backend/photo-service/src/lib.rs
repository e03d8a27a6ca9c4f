//! Photo-share service: credential check at login and the image post
//! submission pipeline (object storage upload + metadata document).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod storage;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use auth::SessionTokens;
use db::{CredentialStore, PostStore};
use storage::BlobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub posts: Arc<dyn PostStore>,
    pub sessions: Arc<SessionTokens>,
    /// Where uploads are spooled before they go to object storage
    pub temp_dir: Arc<PathBuf>,
    pub max_upload_bytes: u64,
}
