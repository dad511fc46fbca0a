//! Settings endpoints: lazy-created read and partial update.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::UpdateSettingsRequest;
use tracing::{error, info};

use crate::io::rest::{domain_error, require_user};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).patch(update_settings))
}

pub async fn get_settings(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/settings for user {}", user_id);

    match state.settings_service.get_or_create(&user_id).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => {
            error!("Failed to load settings: {}", e);
            domain_error(e)
        }
    }
}

pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("PATCH /api/settings for user {} - {:?}", user_id, request);

    match state.settings_service.update(&user_id, request).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => {
            error!("Failed to update settings: {}", e);
            domain_error(e)
        }
    }
}
