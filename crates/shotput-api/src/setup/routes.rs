//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use shotput_core::ServerConfig;
use tower_http::trace::TraceLayer;

use crate::api_doc;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &ServerConfig, state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/", get(handlers::assets::index))
        .route("/script.js", get(handlers::assets::script))
        .route("/health", get(handlers::health::health_check))
        .route("/api/openapi.json", get(api_doc::openapi_json))
        .route("/upload_image/", post(handlers::upload::upload_image))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
