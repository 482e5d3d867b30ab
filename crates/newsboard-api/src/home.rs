use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::{AppState, run_db};

/// GET /
pub async fn homepage(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let posts = run_db(&state, |db| db.posts().list_with_vote_counts()).await?;
    Ok(Html(state.views.homepage(&posts, session.is_logged_in())?))
}

/// GET /login. Visitors who already hold a valid session go back home.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    if let Some(claims) = &session.0 {
        debug!("User {} already logged in, redirecting", claims.sub);
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(state.views.login()?).into_response())
}
