use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use shared::{
    database,
    observability::{init_logging, LogConfig},
};
use tracing::{error, info};

use photo_service::{
    auth::SessionTokens,
    config::Config,
    db::{PgCredentialStore, PgPostStore},
    routes::create_router,
    storage::{BlobStore, S3BlobStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    config.apply_port_arg(std::env::args().nth(1));

    init_logging(LogConfig {
        level: config.log_level,
        format: config.log_format,
        service_name: "photo-service".to_string(),
        ..Default::default()
    })?;

    info!("Starting Photo Service...");

    // Spool directory for incoming uploads
    tokio::fs::create_dir_all(&config.uploads.temp_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads.temp_dir.display()))?;

    let user_pool = database::create_connection_pool(&config.database)
        .await
        .context("Failed to connect to SQL database")?;

    let document_pool = database::connect(
        &config.document_store.url,
        config.document_store.max_connections,
        Duration::from_secs(config.database.connection_timeout),
    )
    .await
    .context("Failed to connect to document store")?;

    sqlx::migrate!("./migrations")
        .run(&document_pool)
        .await
        .context("Failed to run document store migrations")?;
    info!("Document store migrations completed");

    let blobs = S3BlobStore::new(config.object_store.clone()).await;

    // Refuse to serve until every backing service answers
    let reachable = tokio::try_join!(
        async { database::test_connection(&user_pool).await.context("SQL database unreachable") },
        async { database::test_connection(&document_pool).await.context("Document store unreachable") },
        async { blobs.health_check().await.context("Object storage unreachable") },
    );
    if let Err(e) = reachable {
        error!("Cannot connect: {:#}", e);
        return Err(e);
    }
    info!("SQL database, document store and object storage reachable");

    let state = AppState {
        credentials: Arc::new(PgCredentialStore::new(user_pool.clone())),
        blobs: Arc::new(blobs),
        posts: Arc::new(PgPostStore::new(
            document_pool.clone(),
            config.document_store.collection.clone(),
        )),
        sessions: Arc::new(SessionTokens::new(&config.session)),
        temp_dir: Arc::new(config.uploads.temp_dir.clone()),
        max_upload_bytes: config.server.max_body_bytes as u64,
    };

    let app = create_router(state, &config.server.static_dir, config.server.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Application started on http://{}/ at {}", addr, chrono::Utc::now());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::close_connections(&user_pool).await;
    database::close_connections(&document_pool).await;

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
