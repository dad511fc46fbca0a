//! Savings goal endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use shared::{CreateGoalRequest, GoalListResponse, UpdateGoalRequest};
use tracing::{error, info};

use crate::io::rest::{domain_error, require_user};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/:id", put(update_goal).delete(delete_goal))
}

pub async fn list_goals(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("GET /api/goals for user {}", user_id);

    match state.goal_service.list(&user_id).await {
        Ok((goals, active_goal_id)) => {
            (StatusCode::OK, Json(GoalListResponse { goals, active_goal_id })).into_response()
        }
        Err(e) => {
            error!("Failed to list goals: {}", e);
            domain_error(e)
        }
    }
}

pub async fn create_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateGoalRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("POST /api/goals for user {} - {:?}", user_id, request);

    match state.goal_service.create(&user_id, request).await {
        Ok(goal) => (StatusCode::CREATED, Json(goal)).into_response(),
        Err(e) => {
            error!("Failed to create goal: {}", e);
            domain_error(e)
        }
    }
}

pub async fn update_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateGoalRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("PUT /api/goals/{} for user {}", id, user_id);

    match state.goal_service.update(&user_id, &id, request).await {
        Ok(goal) => (StatusCode::OK, Json(goal)).into_response(),
        Err(e) => {
            error!("Failed to update goal: {}", e);
            domain_error(e)
        }
    }
}

pub async fn delete_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    info!("DELETE /api/goals/{} for user {}", id, user_id);

    match state.goal_service.delete(&user_id, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete goal: {}", e);
            domain_error(e)
        }
    }
}
