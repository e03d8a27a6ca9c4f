pub mod post_repository;
pub mod user_repository;

use thiserror::Error;

pub use post_repository::{PgPostStore, PostStore};
pub use user_repository::{CredentialStore, PgCredentialStore};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
