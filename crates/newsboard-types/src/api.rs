use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::User;

// -- Session --

/// Claims carried by the signed session token. Issued at login, checked by
/// the session extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub message: String,
    pub token: String,
}

/// `GET /api/users/{id}`: the user plus everything hanging off it.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub posts: Vec<UserPost>,
    pub comments: Vec<UserComment>,
    pub voted_posts: Vec<VotedPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPost {
    pub id: i64,
    pub title: String,
    pub post_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserComment {
    pub id: i64,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
    pub post: PostTitle,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTitle {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VotedPost {
    pub id: i64,
    pub title: String,
}

// -- Posts --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub post_url: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub title: String,
}

/// A post as shown on the homepage: vote tally, author and comments.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub post_url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    pub comments: Vec<PostComment>,
    pub user: Author,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostComment {
    pub id: i64,
    pub comment_text: String,
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub user: Author,
}

#[derive(Debug, Clone, Serialize)]
pub struct Author {
    pub username: String,
}

// -- Votes --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpvoteRequest {
    pub user_id: i64,
    pub post_id: i64,
}

// -- Comments --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub comment_text: String,
    pub user_id: i64,
    pub post_id: i64,
}

// -- Generic --

/// Result of an update or delete keyed by primary id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedRows {
    pub affected_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}
