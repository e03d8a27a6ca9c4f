use std::time::Duration;

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    Pool, Postgres,
};
use tracing::{debug, error, info, warn};

use super::{DatabaseConfig, DatabaseError, DatabaseResult};

/// Type alias for the database pool
pub type DbPool = Pool<Postgres>;

/// Create a new connection pool with the given configuration
pub async fn create_connection_pool(config: &DatabaseConfig) -> DatabaseResult<DbPool> {
    info!("Creating database connection pool...");
    debug!(
        "Database config: host={}, port={}, database={}",
        config.host, config.port, config.database_name
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .connect(&config.database_url())
        .await
        .map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            DatabaseError::Connection(e)
        })?;

    info!(
        "Database connection pool created successfully with {} max connections",
        config.max_connections
    );

    Ok(pool)
}

/// Connect a pool straight from a URL
pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> DatabaseResult<DbPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| {
            error!("Failed to connect: {}", e);
            DatabaseError::Connection(e)
        })
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> DatabaseResult<()> {
    debug!("Testing database connection...");

    let row: (i32,) = sqlx::query_as("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error!("Database connection test failed: {}", e);
            DatabaseError::Connection(e)
        })?;

    if row.0 != 1 {
        return Err(DatabaseError::Query("Unexpected result from connection test".to_string()));
    }

    debug!("Database connection test successful");
    Ok(())
}

/// Connection health check
pub async fn health_check(pool: &DbPool) -> bool {
    match test_connection(pool).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    }
}

/// Close database connections gracefully
pub async fn close_connections(pool: &DbPool) {
    info!("Closing database connections...");
    pool.close().await;
    info!("Database connections closed");
}
