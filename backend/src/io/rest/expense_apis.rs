//! Ledger entry endpoints, including the weekday bulk insert.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use shared::{
    CreateExpenseBatchRequest, CreateExpenseRequest, ExpenseBatchResponse, ExpenseListResponse,
    UpdateExpenseRequest,
};
use tracing::{error, info};

use crate::io::rest::{domain_error, parse_month, require_user};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/batch", post(create_expense_batch))
        .route("/:id", put(update_expense).delete(delete_expense))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    year: i32,
    month: u32,
}

pub async fn list_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/expenses for user {} - {:?}", user_id, query);

    let month = match parse_month(query.year, query.month) {
        Ok(month) => month,
        Err(response) => return response,
    };

    match state.expense_service.list_month(&user_id, month).await {
        Ok(expenses) => (StatusCode::OK, Json(ExpenseListResponse { expenses })).into_response(),
        Err(e) => {
            error!("Failed to list expenses: {}", e);
            domain_error(e)
        }
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/expenses for user {} - {:?}", user_id, request);

    match state.expense_service.create(&user_id, request).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => {
            error!("Failed to create expense: {}", e);
            domain_error(e)
        }
    }
}

pub async fn create_expense_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateExpenseBatchRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/expenses/batch for user {} - {:?}", user_id, request);

    match state.expense_service.create_batch(&user_id, request).await {
        Ok(created) => {
            let response = ExpenseBatchResponse {
                created_count: created.len(),
                created,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to bulk insert expenses: {}", e);
            domain_error(e)
        }
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("PUT /api/expenses/{} for user {}", id, user_id);

    match state.expense_service.update(&user_id, &id, request).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => {
            error!("Failed to update expense: {}", e);
            domain_error(e)
        }
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("DELETE /api/expenses/{} for user {}", id, user_id);

    match state.expense_service.delete(&user_id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete expense: {}", e);
            domain_error(e)
        }
    }
}
