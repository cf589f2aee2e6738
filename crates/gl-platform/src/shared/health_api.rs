//! Health Check Endpoints
//!
//! Standard liveness endpoint for probes and monitoring.

use axum::{routing::get, Json, Router};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Create health router
pub fn health_router() -> Router {
    Router::new().route("/health", get(health))
}
