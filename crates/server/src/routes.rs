use std::path::Path;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use common::types::Health;
use models::Document;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tower::Layer;
use tracing::Level;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub mod settings;
pub mod slides;
pub mod uploads;

// multipart framing on top of the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// uploaded files are images only: nothing in them may run or load other resources
const UPLOADS_CSP: &str = "default-src 'none'; img-src 'self'; style-src 'unsafe-inline'; sandbox";

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    let (code, body) = service::observability::encode_metrics();
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
}

/// The whole persisted document, as the display page loads it.
pub async fn get_document(State(state): State<AppState>) -> Result<Json<Document>, JsonApiError> {
    Ok(Json(state.store.read().await?))
}

/// Build the full application router: JSON API, uploaded images and the static frontend.
pub fn build_router(state: AppState, cors: CorsLayer, frontend_dir: &Path) -> Router {
    let frontend = ServeDir::new(frontend_dir).fallback(ServeFile::new(frontend_dir.join("index.html")));
    let uploaded = SetResponseHeaderLayer::overriding(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(UPLOADS_CSP),
    )
    .layer(ServeDir::new(state.uploads.dir()));
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;

    let api = Router::new()
        .route("/api/data", get(get_document))
        .route("/api/slides", get(slides::list).post(slides::create))
        .route("/api/slides/visible", get(slides::list_visible))
        .route("/api/slides/reorder", put(slides::reorder))
        .route(
            "/api/slides/:id",
            get(slides::get).put(slides::update).delete(slides::delete),
        )
        .route("/api/settings", get(settings::get).put(settings::update))
        .route("/api/themes", get(settings::themes))
        .route(
            "/api/upload",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .nest_service("/uploads", uploaded)
        .fallback_service(frontend)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
