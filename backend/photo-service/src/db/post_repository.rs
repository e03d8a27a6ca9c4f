use async_trait::async_trait;
use shared::database::{self, DbPool};

use super::RepositoryError;
use crate::models::Post;

/// Document store for post metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &Post) -> Result<(), RepositoryError>;

    async fn health_check(&self) -> bool;
}

/// Documents kept as JSONB rows, one logical collection per `collection` value
pub struct PgPostStore {
    pool: DbPool,
    collection: String,
}

impl PgPostStore {
    pub fn new(pool: DbPool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(&self, post: &Post) -> Result<(), RepositoryError> {
        let body = serde_json::to_value(post)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(post.id)
        .bind(&self.collection)
        .bind(body)
        .bind(post.timestamp)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Inserted document {} into collection {}",
            post.id,
            self.collection
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        database::health_check(&self.pool).await
    }
}
