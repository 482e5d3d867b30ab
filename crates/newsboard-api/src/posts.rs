use axum::extract::{Path, State};
use axum::response::IntoResponse;
use tracing::info;

use newsboard_types::api::{AffectedRows, CreatePostRequest, UpdatePostRequest, UpvoteRequest};

use crate::error::ApiError;
use crate::extract::Json;
use crate::state::{AppState, run_db};

const NO_POST: &str = "No post found with this id";

/// GET /api/posts
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = run_db(&state, |db| db.posts().list_with_vote_counts()).await?;
    Ok(Json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = run_db(&state, move |db| db.posts().get_with_vote_count(id))
        .await?
        .ok_or(ApiError::NotFound(NO_POST))?;
    Ok(Json(post))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = run_db(&state, move |db| db.posts().create(&req)).await?;
    info!("Post {} created by user {}", post.id, post.user_id);
    Ok(Json(post))
}

/// PUT /api/posts/upvote: records the vote, answers with the post's new tally.
pub async fn upvote(
    State(state): State<AppState>,
    Json(req): Json<UpvoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = run_db(&state, move |db| {
        db.votes().upvote(&req)?;
        db.posts().get_with_vote_count(req.post_id)
    })
    .await?
    .ok_or(ApiError::NotFound(NO_POST))?;
    Ok(Json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let affected_rows = run_db(&state, move |db| db.posts().update_title(id, &req)).await?;
    if affected_rows == 0 {
        return Err(ApiError::NotFound(NO_POST));
    }
    Ok(Json(AffectedRows { affected_rows }))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let affected_rows = run_db(&state, move |db| db.posts().delete(id)).await?;
    if affected_rows == 0 {
        return Err(ApiError::NotFound(NO_POST));
    }
    Ok(Json(AffectedRows { affected_rows }))
}
