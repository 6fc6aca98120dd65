use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::RequestStore;

pub mod requests;
pub mod user_info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RequestStore>,
}

impl AppState {
    pub fn new(store: RequestStore) -> Self {
        Self { store: Arc::new(store) }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> (StatusCode, String) {
    match common::metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}")),
    }
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/user-info", get(user_info::get_user_info).put(user_info::save_user_info))
        .route("/api/requests", get(requests::list_requests).post(requests::create_request))
        .route("/api/requests/:id/status", patch(requests::update_request_status))
        .route("/api/data", delete(requests::clear_all_data));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
