use axum::extract::{Path, State};
use axum::response::IntoResponse;

use newsboard_types::api::{AffectedRows, CreateUserRequest, UpdateUserRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::state::{AppState, run_db};

const NO_USER: &str = "No user found with this id";

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = run_db(&state, |db| db.users().list()).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_db(&state, move |db| db.users().get(id))
        .await?
        .ok_or(ApiError::NotFound(NO_USER))?;
    Ok(Json(user))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_db(&state, move |db| db.users().create(&req)).await?;
    Ok(Json(user))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let affected_rows = run_db(&state, move |db| db.users().update(id, &req)).await?;
    if affected_rows == 0 {
        return Err(ApiError::NotFound(NO_USER));
    }
    Ok(Json(AffectedRows { affected_rows }))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let affected_rows = run_db(&state, move |db| db.users().delete(id)).await?;
    if affected_rows == 0 {
        return Err(ApiError::NotFound(NO_USER));
    }
    Ok(Json(AffectedRows { affected_rows }))
}
