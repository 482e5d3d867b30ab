use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use newsboard_db::DbError;
use newsboard_types::api::MessageBody;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input shape or a constraint the input broke.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// Unknown email or wrong password. Reported as 400, one message per cause.
    #[error("{0}")]
    Auth(&'static str),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(e) => ApiError::Validation(e.to_string()),
            DbError::Duplicate(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Auth(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                error!("request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(MessageBody {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use newsboard_types::ValidationError;

    use super::*;

    #[test]
    fn db_errors_map_to_client_or_server_side() {
        let e: ApiError = DbError::Validation(ValidationError::InvalidUrl).into();
        assert!(matches!(e, ApiError::Validation(ref m) if m == "post_url must be a valid URL"));

        let e: ApiError = DbError::Duplicate("email must be unique".into()).into();
        assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST);

        let e: ApiError = DbError::Hash("bad".into()).into();
        assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e = ApiError::NotFound("No user found with this id");
        assert_eq!(e.into_response().status(), StatusCode::NOT_FOUND);
    }
}
