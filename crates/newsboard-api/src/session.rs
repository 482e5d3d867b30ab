use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use newsboard_types::api::Claims;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

const SESSION_TTL_HOURS: i64 = 24;

pub fn create_token(secret: &str, user_id: i64, username: &str) -> anyhow::Result<String> {
    let expires = chrono::Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS);
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: expires.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// The caller's session, if they presented a valid one.
///
/// Read from the `session` cookie, falling back to `Authorization: Bearer`.
/// A missing, expired or forged token yields `Session(None)`; handlers decide
/// what that means.
#[derive(Debug, Clone)]
pub struct Session(pub Option<Claims>);

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for Session
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(str::to_string)
            });

        Ok(Session(
            token.and_then(|t| verify_token(&app.session_secret, &t).ok()),
        ))
    }
}
