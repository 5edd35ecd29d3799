use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all dimagram endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> ServerResult<Router> {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/api/album",
            get(handler::album_handler).post(handler::replace_album_handler),
        )
        .route("/api/archive", get(handler::archive_handler))
        .route("/api/publish", post(handler::publish_handler))
        .route("/api/unpublish", post(handler::unpublish_handler))
        .route("/api/upload", post(handler::upload_handler))
        .layer(DefaultBodyLimit::max(config.max_request_bytes))
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    Ok(router)
}
