use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use shared::{
    database::DatabaseConfig,
    observability::{LogFormat, LogLevel},
};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub object_store: ObjectStoreConfig,
    pub document_store: DocumentStoreConfig,
    pub uploads: UploadConfig,
    pub session: SessionConfig,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the prebuilt frontend bundle
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// Bare hostname of the S3-compatible endpoint, e.g. `sgp1.digitaloceanspaces.com`
    pub hostname: String,
    /// `https` unless overridden, e.g. `http` for a local MinIO
    pub scheme: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl ObjectStoreConfig {
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}", self.scheme, self.hostname)
    }

    /// Public, virtual-host style URL of an object in the bucket
    pub fn public_url(&self, key: &str) -> String {
        format!("{}://{}.{}/{}", self.scheme, self.bucket, self.hostname, key)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    pub url: String,
    pub collection: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub temp_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{} is not set", key));

        let database = DatabaseConfig::from_vars(&lookup).context("Invalid SQL database configuration")?;

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
                static_dir: lookup("STATIC_DIR")
                    .unwrap_or_else(|| "dist/frontend".to_string())
                    .into(),
                max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            },
            database,
            object_store: ObjectStoreConfig {
                hostname: required("S3_HOSTNAME")?,
                scheme: lookup("S3_SCHEME").unwrap_or_else(|| "https".to_string()),
                bucket: required("S3_BUCKET")?,
                region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: required("S3_ACCESS_KEY_ID")?,
                secret_access_key: required("S3_SECRET_ACCESS_KEY")?,
            },
            document_store: DocumentStoreConfig {
                url: required("DOCUMENT_STORE_URL")?,
                collection: lookup("DOCUMENT_STORE_COLLECTION").unwrap_or_else(|| "posts".to_string()),
                max_connections: parse_or(&lookup, "DOCUMENT_STORE_MAX_CONNECTIONS", 10)?,
            },
            uploads: UploadConfig {
                temp_dir: lookup("UPLOAD_TEMP_DIR")
                    .unwrap_or_else(|| "./temp".to_string())
                    .into(),
            },
            session: SessionConfig {
                secret: required("JWT_SECRET")?,
                ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", 24)?,
            },
            log_level: LogLevel::parse(&lookup("LOG_LEVEL").unwrap_or_default()),
            log_format: LogFormat::parse(&lookup("LOG_FORMAT").unwrap_or_default()),
        })
    }

    /// A port given as the first CLI argument takes precedence over `PORT`
    pub fn apply_port_arg(&mut self, arg: Option<String>) {
        if let Some(port) = arg.and_then(|raw| raw.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
