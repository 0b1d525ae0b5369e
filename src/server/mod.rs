//! HTTP API.
//!
//! # Endpoints
//!
//! - `POST /api/extract-text` - text of an uploaded PDF, DOCX or image
//! - `POST /api/ocr-image` - text of a cropped image snippet
//! - `POST /api/extract-fields` - text plus voted vendor/serial/part fields
//! - `GET /health` - liveness probe
//!
//! # cURL Examples
//!
//! ```bash
//! curl -F "file=@nameplate.pdf" http://localhost:5000/api/extract-text
//! curl -F "cropped_image=@crop.png" http://localhost:5000/api/ocr-image
//! curl -F "file=@nameplate.jpg" http://localhost:5000/api/extract-fields
//! ```

pub mod error;
pub mod handlers;
pub mod types;

pub use error::ApiError;
pub use types::AppState;

use crate::config::{ExtractionConfig, ServerConfig};
use crate::pipeline::ocr::OcrEngine;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use handlers::{extract_fields_handler, extract_text_handler, health_handler, ocr_image_handler};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the router with every route, body limits, CORS and request tracing.
///
/// Public so the routes can be mounted inside a larger application or driven
/// directly in tests.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/api/extract-text", post(extract_text_handler))
        .route("/api/ocr-image", post(ocr_image_handler))
        .route("/api/extract-fields", post(extract_fields_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin unless an allow-list is configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS restricted to {} origin(s)", allowed.len());
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Bind `server.host:server.port` and serve until Ctrl-C.
pub async fn serve(
    config: ExtractionConfig,
    server: ServerConfig,
    engine: Arc<dyn OcrEngine>,
) -> std::io::Result<()> {
    let router = create_router(AppState::new(config, engine), &server);
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on http://{} (upload limit {} bytes)",
        listener.local_addr()?,
        server.max_upload_bytes
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
