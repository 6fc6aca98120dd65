use axum::{extract::State, http::StatusCode, Json};
use models::UserInfo;

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// Stored contact record; 404 when none has been saved.
pub async fn get_user_info(State(state): State<AppState>) -> Result<Json<UserInfo>, JsonApiError> {
    state
        .store
        .get_user_info()
        .await
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("no user info stored"))
}

pub async fn save_user_info(State(state): State<AppState>, Json(info): Json<UserInfo>) -> StatusCode {
    state.store.save_user_info(&info).await;
    StatusCode::NO_CONTENT
}
