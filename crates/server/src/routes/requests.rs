use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{NewSupplyRequest, RequestStatus, SupplyRequest};
use serde::Deserialize;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

/// All requests, newest first.
pub async fn list_requests(State(state): State<AppState>) -> Json<Vec<SupplyRequest>> {
    Json(state.store.get_requests().await)
}

/// Create a pending request. Without `userInfo` in the body the stored
/// contact record is snapshotted into the request.
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<NewSupplyRequest>,
) -> Result<(StatusCode, Json<SupplyRequest>), JsonApiError> {
    let stored = match input.user_info {
        Some(_) => None,
        None => state.store.get_user_info().await,
    };
    let request = input.into_request(stored)?;
    info!(id = %request.id, items = request.supplies.len(), "supply request received");
    state.store.save_request(request.clone()).await;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Relabel a request. Unknown ids are accepted and change nothing.
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> StatusCode {
    state.store.update_request_status(&id, update.status).await;
    StatusCode::NO_CONTENT
}

pub async fn clear_all_data(State(state): State<AppState>) -> StatusCode {
    state.store.clear_all_data().await;
    StatusCode::NO_CONTENT
}
