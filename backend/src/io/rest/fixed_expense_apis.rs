//! Fixed recurring cost endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use shared::{CreateFixedExpenseRequest, FixedExpenseListResponse, UpdateFixedExpenseRequest};
use tracing::{error, info};

use crate::io::rest::{domain_error, require_user};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fixed_expenses).post(create_fixed_expense))
        .route("/:id", put(update_fixed_expense).delete(delete_fixed_expense))
}

pub async fn list_fixed_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/fixed-expenses for user {}", user_id);

    match state.fixed_expense_service.list(&user_id).await {
        Ok(fixed_expenses) => {
            (StatusCode::OK, Json(FixedExpenseListResponse { fixed_expenses })).into_response()
        }
        Err(e) => {
            error!("Failed to list fixed expenses: {}", e);
            domain_error(e)
        }
    }
}

pub async fn create_fixed_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateFixedExpenseRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/fixed-expenses for user {} - {:?}", user_id, request);

    match state.fixed_expense_service.create(&user_id, request).await {
        Ok(fixed) => (StatusCode::CREATED, Json(fixed)).into_response(),
        Err(e) => {
            error!("Failed to create fixed expense: {}", e);
            domain_error(e)
        }
    }
}

pub async fn update_fixed_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateFixedExpenseRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("PUT /api/fixed-expenses/{} for user {}", id, user_id);

    match state
        .fixed_expense_service
        .update(&user_id, &id, request)
        .await
    {
        Ok(fixed) => (StatusCode::OK, Json(fixed)).into_response(),
        Err(e) => {
            error!("Failed to update fixed expense: {}", e);
            domain_error(e)
        }
    }
}

pub async fn delete_fixed_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("DELETE /api/fixed-expenses/{} for user {}", id, user_id);

    match state.fixed_expense_service.delete(&user_id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete fixed expense: {}", e);
            domain_error(e)
        }
    }
}
