use async_trait::async_trait;
use shared::database::{self, DbPool};

use super::RepositoryError;

/// Read-only access to the externally managed `users` table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored password digest for `user_id`, if the user exists
    async fn find_password_digest(&self, user_id: &str) -> Result<Option<String>, RepositoryError>;

    async fn health_check(&self) -> bool;
}

pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_password_digest(&self, user_id: &str) -> Result<Option<String>, RepositoryError> {
        let digest: Option<String> = sqlx::query_scalar(
            r#"
            SELECT password FROM users WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(digest)
    }

    async fn health_check(&self) -> bool {
        database::health_check(&self.pool).await
    }
}
