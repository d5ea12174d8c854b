pub mod chat;
pub mod documents;
pub mod health;
pub mod ui;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{middleware::request_logger, state::AppState};

// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let max_upload = state.config.config.upload.max_bytes;

    Router::new()
        .route("/", get(ui::index).layer(CompressionLayer::new()))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes(max_upload))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes(max_upload: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            post(documents::upload_document)
                .layer(DefaultBodyLimit::max(max_upload.saturating_add(MULTIPART_OVERHEAD))),
        )
        .route("/documents/current", get(documents::current_document))
        .route("/chat", post(chat::chat_handler))
        .route("/chat/history", get(chat::chat_history))
}
