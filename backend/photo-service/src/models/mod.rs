use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /api/login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Successful login. The session token is repeated under `password`, the
/// field the frontend stores and sends back with each post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub login: String,
    pub user_id: String,
    pub token: String,
    pub password: String,
}

impl LoginResponse {
    pub fn success(user_id: String, token: String) -> Self {
        Self {
            login: "success".to_string(),
            user_id,
            password: token.clone(),
            token,
        }
    }
}

/// Metadata document recorded for one submitted post.
///
/// Serialized with the field names the frontend reads (`ts`, `image`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub comments: String,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "image")]
    pub image_url: String,
}

impl Post {
    pub fn new(title: String, comments: String, image_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            comments,
            timestamp: Utc::now(),
            image_url,
        }
    }
}

/// Text fields of a post submission, after the multipart body is read
#[derive(Debug, Clone, Default, Validate)]
pub struct PostFields {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    pub token: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "comments is required"))]
    pub comments: String,
}

/// Where a submission is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Received,
    Authenticating,
    PersistingBlob,
    PersistingMetadata,
    Cleanup,
    Done,
}

impl SubmissionStage {
    pub fn as_str(&self) -> &str {
        match self {
            SubmissionStage::Received => "received",
            SubmissionStage::Authenticating => "authenticating",
            SubmissionStage::PersistingBlob => "persisting_blob",
            SubmissionStage::PersistingMetadata => "persisting_metadata",
            SubmissionStage::Cleanup => "cleanup",
            SubmissionStage::Done => "done",
        }
    }
}

impl std::fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
