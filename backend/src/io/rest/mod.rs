//! REST interface layer.
//!
//! A pure translation layer: handlers pull the caller's identity from the
//! `x-user-id` header (session verification is the authentication
//! collaborator's job), forward to the domain services, and translate
//! failures into HTTP status codes with a uniform `{"error": …}` body.
//! No business logic lives here.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use shared::ErrorResponse;

use crate::AppState;

pub mod budget_apis;
pub mod calendar_apis;
pub mod expense_apis;
pub mod fixed_expense_apis;
pub mod goal_apis;
pub mod settings_apis;

/// The full API surface, nested per entity family.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/settings", settings_apis::router())
        .nest("/expenses", expense_apis::router())
        .nest("/fixed-expenses", fixed_expense_apis::router())
        .nest("/goals", goal_apis::router())
        .nest("/budget", budget_apis::router())
        .nest("/calendar", calendar_apis::router())
}

/// Identity supplied by the authentication collaborator.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
        .ok_or_else(|| {
            error_response(StatusCode::UNAUTHORIZED, "Missing x-user-id header")
        })
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Map a domain failure onto a status code by its message, the way the
/// services phrase their validation and lookup errors.
pub(crate) fn domain_error(e: anyhow::Error) -> Response {
    let message = e.to_string();
    let status = if message.contains("not found") {
        StatusCode::NOT_FOUND
    } else if message.contains("cannot")
        || message.contains("must")
        || message.contains("Invalid")
        || message.contains("required")
        || message.contains("too large")
    {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, message)
}

/// Validate a `year`/`month` query pair into a month key.
pub(crate) fn parse_month(year: i32, month: u32) -> Result<shared::Month, Response> {
    if !(1..=12).contains(&month) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid month: {}. Must be 1-12", month),
        ));
    }
    Ok(shared::Month::new(year, month))
}
