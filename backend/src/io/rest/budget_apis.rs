//! Budget view endpoints: single month, month ranges for analytics, per-day
//! detail and category aggregation.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::{BudgetRangeResponse, CategoryBreakdownResponse, Month};
use tracing::{error, info};

use crate::io::rest::{domain_error, error_response, parse_month, require_user};
use crate::AppState;

/// Upper bound on an analytics range request.
const MAX_RANGE_MONTHS: usize = 60;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_month_budget))
        .route("/range", get(get_budget_range))
        .route("/day", get(get_day_summary))
        .route("/categories", get(get_categories))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    year: i32,
    month: u32,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    from_year: i32,
    from_month: u32,
    to_year: i32,
    to_month: u32,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    date: NaiveDate,
}

pub async fn get_month_budget(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/budget for user {} - {:?}", user_id, query);

    let month = match parse_month(query.year, query.month) {
        Ok(month) => month,
        Err(response) => return response,
    };

    match state.budget_service.month_view(&user_id, month).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            error!("Failed to derive budget: {}", e);
            domain_error(e)
        }
    }
}

pub async fn get_budget_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/budget/range for user {} - {:?}", user_id, query);

    let from = match parse_month(query.from_year, query.from_month) {
        Ok(month) => month,
        Err(response) => return response,
    };
    let to = match parse_month(query.to_year, query.to_month) {
        Ok(month) => month,
        Err(response) => return response,
    };
    if Month::range(from, to).len() > MAX_RANGE_MONTHS {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Month range too large. Maximum is {} months", MAX_RANGE_MONTHS),
        );
    }

    match state.budget_service.months_view(&user_id, from, to).await {
        Ok(months) => (StatusCode::OK, Json(BudgetRangeResponse { months })).into_response(),
        Err(e) => {
            error!("Failed to derive budget range: {}", e);
            domain_error(e)
        }
    }
}

pub async fn get_day_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DayQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/budget/day for user {} - {:?}", user_id, query);

    match state.budget_service.day_view(&user_id, query.date).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to derive day summary: {}", e);
            domain_error(e)
        }
    }
}

pub async fn get_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/budget/categories for user {} - {:?}", user_id, query);

    let month = match parse_month(query.year, query.month) {
        Ok(month) => month,
        Err(response) => return response,
    };

    match state.budget_service.categories(&user_id, month).await {
        Ok((categories, total)) => {
            (StatusCode::OK, Json(CategoryBreakdownResponse { categories, total })).into_response()
        }
        Err(e) => {
            error!("Failed to aggregate categories: {}", e);
            domain_error(e)
        }
    }
}
