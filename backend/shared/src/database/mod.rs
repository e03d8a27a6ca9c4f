pub mod connection;

pub use connection::{
    close_connections,
    connect,
    create_connection_pool,
    health_check,
    test_connection,
    DbPool,
};

/// SQL database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database_name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
    pub idle_timeout: u64,
    pub ssl_mode: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "photo_share".to_string(),
            password: String::new(),
            database_name: "photo_share".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout: 30,
            idle_timeout: 600,
            ssl_mode: "prefer".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> DatabaseResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, `DATABASE_*` keys
    pub fn from_vars<F>(lookup: F) -> DatabaseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let required = |key: &str| {
            lookup(key).ok_or_else(|| DatabaseError::Config(format!("{} is not set", key)))
        };

        Ok(Self {
            host: lookup("DATABASE_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "DATABASE_PORT", defaults.port)?,
            username: required("DATABASE_USER")?,
            password: required("DATABASE_PASSWORD")?,
            database_name: required("DATABASE_NAME")?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
            connection_timeout: parse_or(&lookup, "DATABASE_CONNECTION_TIMEOUT", defaults.connection_timeout)?,
            idle_timeout: parse_or(&lookup, "DATABASE_IDLE_TIMEOUT", defaults.idle_timeout)?,
            ssl_mode: lookup("DATABASE_SSL_MODE").unwrap_or(defaults.ssl_mode),
        })
    }

    /// Build the database URL from configuration
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            self.username,
            self.password,
            self.host,
            self.port,
            self.database_name,
            self.ssl_mode
        )
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> DatabaseResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DatabaseError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

// Error types for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
