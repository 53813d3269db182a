//! # Hazard Report Server
//!
//! HTTP API over the Hazard Report submission service. The binary in
//! `main.rs` loads configuration, builds the store and serves [`build_app`].

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use api::AppState;
pub use config::ServerConfig;
pub use error::{ApiError, ServerError};

/// Build the full application router
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .with_state(state.clone())
        .nest("/api", api::create_router(state))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if config.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let incidents = state
        .service
        .incident_count()
        .map_err(|e| ApiError::from_core(e, "Failed to read status"))?;

    Ok(Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hazard-report",
        "incidents": incidents,
    })))
}
