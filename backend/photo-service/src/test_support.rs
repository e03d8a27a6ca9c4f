//! In-memory stores and request helpers for router-level tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::auth::SessionTokens;
use crate::config::SessionConfig;
use crate::db::{CredentialStore, PostStore, RepositoryError};
use crate::models::Post;
use crate::routes::create_router;
use crate::storage::{BlobStore, StorageError};
use crate::AppState;

const BOUNDARY: &str = "photo-share-test-boundary";
pub const PUBLIC_BASE: &str = "https://test-bucket.objects.test";

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
}

#[async_trait]
impl CredentialStore for InMemoryUsers {
    async fn find_password_digest(&self, user_id: &str) -> Result<Option<String>, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn health_check(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}

/// A stored object: bytes plus content type
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct InMemoryBlobs {
    objects: Mutex<HashMap<String, StoredObject>>,
    deleted: Mutex<Vec<String>>,
    fail_puts: AtomicBool,
}

impl InMemoryBlobs {
    pub fn objects(&self) -> HashMap<String, StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobs {
    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        content_length: u64,
    ) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Upload("bucket rejected the object".to_string()));
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        assert_eq!(data.len() as u64, content_length);

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE, key)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPosts {
    posts: Mutex<Vec<Post>>,
    fail: AtomicBool,
}

impl InMemoryPosts {
    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostStore for InMemoryPosts {
    async fn insert_post(&self, post: &Post) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}

/// One part of a multipart request body
#[derive(Clone, Copy)]
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub struct TestApp {
    dir: TempDir,
    pub users: Arc<InMemoryUsers>,
    pub blobs: Arc<InMemoryBlobs>,
    pub posts: Arc<InMemoryPosts>,
    blob_store: Arc<dyn BlobStore>,
    post_store: Arc<dyn PostStore>,
    sessions: Arc<SessionTokens>,
    max_upload_bytes: u64,
    max_body_bytes: usize,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        std::fs::create_dir_all(dir.path().join("temp")).unwrap();
        std::fs::write(
            dir.path().join("static").join("index.html"),
            "<html><body><app-root></app-root></body></html>",
        )
        .unwrap();

        let blobs = Arc::new(InMemoryBlobs::default());
        let posts = Arc::new(InMemoryPosts::default());

        Self {
            dir,
            users: Arc::new(InMemoryUsers::default()),
            blob_store: blobs.clone(),
            post_store: posts.clone(),
            blobs,
            posts,
            sessions: Arc::new(SessionTokens::new(&SessionConfig {
                secret: "test-secret".to_string(),
                ttl_hours: 1,
            })),
            max_upload_bytes: 1024 * 1024,
            max_body_bytes: 8 * 1024 * 1024,
        }
    }

    /// Swap in other stores, e.g. mocks with call expectations
    pub fn with_stores(mut self, blobs: Arc<dyn BlobStore>, posts: Arc<dyn PostStore>) -> Self {
        self.blob_store = blobs;
        self.post_store = posts;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn user(&self, user_id: &str, digest: &str) {
        self.users
            .users
            .lock()
            .unwrap()
            .insert(user_id.to_string(), digest.to_string());
    }

    pub fn fail_credential_lookups(&self) {
        self.users.fail.store(true, Ordering::SeqCst);
    }

    pub fn fail_blob_puts(&self) {
        self.blobs.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_post_inserts(&self) {
        self.posts.fail.store(true, Ordering::SeqCst);
    }

    pub fn sessions(&self) -> &SessionTokens {
        &self.sessions
    }

    pub fn token_for(&self, user_id: &str) -> String {
        self.sessions.issue(user_id).unwrap()
    }

    pub fn static_dir(&self) -> PathBuf {
        self.dir.path().join("static")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.dir.path().join("temp")
    }

    /// Files currently left in the upload temp directory
    pub fn temp_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir()).unwrap().count()
    }

    pub fn state(&self) -> AppState {
        AppState {
            credentials: self.users.clone(),
            blobs: self.blob_store.clone(),
            posts: self.post_store.clone(),
            sessions: self.sessions.clone(),
            temp_dir: Arc::new(self.temp_dir()),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state(), &self.static_dir(), self.max_body_bytes)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(&self, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Like [`TestApp::post_multipart`], but streams the body in `chunk_size`
    /// pieces so body limits trip partway through
    pub async fn post_multipart_chunked(
        &self,
        uri: &str,
        parts: &[Part<'_>],
        chunk_size: usize,
    ) -> (StatusCode, Value) {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = multipart_body(parts)
            .chunks(chunk_size)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();

        let request = Request::post(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();
        self.send(request).await
    }

    pub async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
