use axum::extract::{Path, State};
use axum::response::IntoResponse;

use newsboard_types::api::{AffectedRows, CreateCommentRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::state::{AppState, run_db};

pub async fn list_comments(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let comments = run_db(&state, |db| db.comments().list()).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = run_db(&state, move |db| db.comments().create(&req)).await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let affected_rows = run_db(&state, move |db| db.comments().delete(id)).await?;
    if affected_rows == 0 {
        return Err(ApiError::NotFound("No comment found with this id"));
    }
    Ok(Json(AffectedRows { affected_rows }))
}
