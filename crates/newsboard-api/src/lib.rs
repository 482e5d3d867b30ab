pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod home;
pub mod posts;
pub mod session;
pub mod state;
pub mod users;
pub mod views;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post, put},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// Every route the application serves. Layers (CORS, tracing) are added by
/// the binary.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/login", post(auth::login))
        .route("/users/logout", post(auth::logout))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/upvote", put(posts::upvote))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/{id}", delete(comments::delete_comment))
        .fallback(not_found);

    Router::new()
        .route("/", get(home::homepage))
        .route("/login", get(home::login_page))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
