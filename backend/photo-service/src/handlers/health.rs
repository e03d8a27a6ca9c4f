use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Service status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

impl From<bool> for ServiceStatus {
    fn from(ok: bool) -> Self {
        if ok {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        }
    }
}

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub services: DependencyHealth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub database: ServiceStatus,
    pub object_store: ServiceStatus,
    pub document_store: ServiceStatus,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, object_store, document_store) = tokio::join!(
        state.credentials.health_check(),
        state.blobs.health_check(),
        state.posts.health_check(),
    );

    let object_store = match object_store {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Object store health check failed: {}", e);
            false
        }
    };

    let healthy = database && object_store && document_store;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: healthy.into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        services: DependencyHealth {
            database: database.into(),
            object_store: object_store.into(),
            document_store: document_store.into(),
        },
    };

    (status, Json(response))
}
