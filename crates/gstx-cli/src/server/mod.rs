//! HTTP API.

mod routes;
pub mod store;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use gstx_core::models::config::ServerConfig;
use gstx_core::KeywordScanner;

use crate::service::ExtractionService;

pub use store::{ExtractionStore, MemoryStore, StoredExtraction};

/// Multipart framing allowance on top of the upload limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
    pub store: Arc<dyn ExtractionStore>,
    pub scanner: KeywordScanner,
    pub max_upload_bytes: u64,
}

/// Build the API router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let body_limit = (config.max_upload_bytes as usize).saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/extract/image", post(routes::extract_image))
        .route("/extract/text", post(routes::extract_text))
        .route("/scan/text", post(routes::scan_text))
        .route(
            "/extraction/:id",
            get(routes::get_extraction).delete(routes::delete_extraction),
        )
        .route("/extraction/:id/download", get(routes::download_extraction))
        .route("/extractions", get(routes::list_extractions))
        .route("/stats", get(routes::stats))
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(cors_layer(&config.allowed_origins)),
        )
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /extract/image  - extract from an invoice image");
    info!("  POST /extract/text   - extract from invoice text");
    info!("  POST /scan/text      - keyword scan (low confidence)");
    info!("  GET  /extractions    - list stored extractions");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
