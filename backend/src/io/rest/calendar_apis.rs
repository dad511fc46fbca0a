//! Calendar integration endpoints: handshake start, code callback, status
//! and event sync. The event sync never fails the caller: provider trouble
//! degrades to an empty list.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::{
    CalendarCallbackRequest, CalendarConnectResponse, CalendarEventsResponse,
    CalendarStatusResponse,
};
use tracing::{error, info};

use crate::io::rest::{error_response, parse_month, require_user};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect", post(start_connect))
        .route("/callback", post(complete_connect))
        .route("/status", get(get_status))
        .route("/events", get(get_events))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    year: i32,
    month: u32,
}

pub async fn start_connect(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/calendar/connect for user {}", user_id);

    match state.calendar_sync_service.connect_url(&user_id) {
        Ok(url) => (StatusCode::OK, Json(CalendarConnectResponse { url })).into_response(),
        Err(e) => {
            error!("Failed to start calendar handshake: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

pub async fn complete_connect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CalendarCallbackRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/calendar/callback for user {}", user_id);

    match state
        .calendar_sync_service
        .complete_connection(&user_id, &request.code)
        .await
    {
        Ok(()) => {
            (StatusCode::OK, Json(CalendarStatusResponse { connected: true })).into_response()
        }
        Err(e) => {
            error!("Failed to complete calendar handshake: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub async fn get_status(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/calendar/status for user {}", user_id);

    // Storage trouble reads as "not connected" rather than an error
    let connected = state
        .calendar_sync_service
        .status(&user_id)
        .await
        .unwrap_or(false);
    (StatusCode::OK, Json(CalendarStatusResponse { connected })).into_response()
}

pub async fn get_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/calendar/events for user {} - {:?}", user_id, query);

    let month = match parse_month(query.year, query.month) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let events = state
        .calendar_sync_service
        .events_for_month(&user_id, month)
        .await;
    (StatusCode::OK, Json(CalendarEventsResponse { events })).into_response()
}
