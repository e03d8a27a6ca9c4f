use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers;
use crate::AppState;

/// Build the application router.
///
/// Anything that is not an API route is served from the frontend bundle in
/// `static_dir`; unknown paths get its `index.html` so client-side routes can
/// be bookmarked.
pub fn create_router(state: AppState, static_dir: &Path, max_body_bytes: usize) -> Router {
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/post", post(handlers::post::submit_post))
        .fallback_service(frontend)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body_bytes))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
