use newsboard_types::ValidationError;
use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before it reached the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A unique constraint refused the write.
    #[error("{0}")]
    Duplicate(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
            if code.code == ErrorCode::ConstraintViolation
                && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            {
                return DbError::Duplicate(unique_message(msg));
            }
        }
        DbError::Sqlite(err)
    }
}

/// "UNIQUE constraint failed: user.email" -> "email must be unique"
fn unique_message(msg: &str) -> String {
    msg.strip_prefix("UNIQUE constraint failed: ")
        .and_then(|cols| cols.split(", ").next())
        .and_then(|col| col.rsplit('.').next())
        .map(|col| format!("{col} must be unique"))
        .unwrap_or_else(|| msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_names_the_column() {
        assert_eq!(
            unique_message("UNIQUE constraint failed: user.email"),
            "email must be unique"
        );
        assert_eq!(
            unique_message("UNIQUE constraint failed: vote.user_id, vote.post_id"),
            "user_id must be unique"
        );
        assert_eq!(unique_message("something else"), "something else");
    }
}
