//! Gatherly Server
//!
//! Production server for the community-events REST API:
//! - Event APIs: browse, search, create, join, update, delete
//! - Health endpoint and Swagger UI
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GL_API_PORT` | `3000` | HTTP API port |
//! | `GL_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `GL_MONGO_DB` | `gatherly` | MongoDB database name |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | text | Set to `json` for JSON logs |

use std::sync::Arc;
use axum::Router;
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::info;
use tokio::{net::TcpListener, signal};
use utoipa_swagger_ui::SwaggerUi;

use gl_platform::shared::health_router;
use gl_platform::shared::indexes::initialize_indexes;
use gl_platform::{events_router, EventRepository, EventsState};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    gl_common::logging::init_logging("gl-server");

    info!("Starting Gatherly Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("GL_API_PORT", 3000);
    let mongo_url = env_or("GL_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("GL_MONGO_DB", "gatherly");

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    // Fail fast if the store is unreachable
    mongo_client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;
    info!("MongoDB connection verified");

    if let Err(e) = initialize_indexes(&db).await {
        tracing::warn!("Index initialization failed (indexes may already exist): {}", e);
    }

    // Initialize repositories
    let event_repo = Arc::new(EventRepository::new(&db));
    info!("Repositories initialized");

    let events_state = EventsState { event_repo };

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .merge(events_router(events_state))
        .split_for_parts();

    openapi.info.title = "Gatherly API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description =
        Some("REST API for browsing, joining, and managing community events".to_string());

    let app = Router::new()
        .merge(router)
        .merge(health_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;

    info!("Gatherly Server started");
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gatherly Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
