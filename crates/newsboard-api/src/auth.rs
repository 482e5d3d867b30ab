use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::info;

use newsboard_db::password;
use newsboard_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::extract::Json;
use crate::session::{SESSION_COOKIE, create_token};
use crate::state::{AppState, run_db};

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Lookup and hash check both run on the blocking pool; verify is slow on
    // purpose.
    let found = run_db(&state, move |db| {
        let Some(row) = db.users().find_by_email(&req.email)? else {
            return Ok(None);
        };
        let valid = password::verify(&req.password, &row.password)?;
        Ok(Some((row, valid)))
    })
    .await?;

    let Some((row, valid)) = found else {
        return Err(ApiError::Auth("No user with that email address!"));
    };
    if !valid {
        return Err(ApiError::Auth("Incorrect password!"));
    }

    let token = create_token(&state.session_secret, row.id, &row.username)?;
    info!("User {} logged in", row.id);

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: row.into_user(),
            message: "You are now logged in!".to_string(),
            token,
        }),
    ))
}

/// POST /api/users/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}
