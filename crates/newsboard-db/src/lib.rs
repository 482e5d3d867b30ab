pub mod comments;
pub mod error;
pub mod migrations;
pub mod models;
pub mod password;
pub mod posts;
pub mod schema;
pub mod users;
pub mod votes;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

pub use comments::Comments;
pub use error::{DbError, Result};
pub use posts::Posts;
pub use users::Users;
pub use votes::Votes;

/// The store. One SQLite connection behind a mutex; repositories borrow it
/// through [`Database::users`], [`Database::posts`] and friends.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn posts(&self) -> Posts<'_> {
        Posts::new(self)
    }

    pub fn comments(&self) -> Comments<'_> {
        Comments::new(self)
    }

    pub fn votes(&self) -> Votes<'_> {
        Votes::new(self)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Like [`Database::with_conn`] but hands out `&mut` so writers can open
    /// a transaction.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }
}

/// `table` is always one of the [`schema`] table constants, never input.
pub(crate) fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found = conn
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Read a `datetime('now')` column. SQLite stores "YYYY-MM-DD HH:MM:SS"
/// without a zone; those are UTC.
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use newsboard_types::api::{CreatePostRequest, CreateUserRequest};
    use newsboard_types::models::{Post, User};

    use crate::Database;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn user(db: &Database, name: &str) -> User {
        db.users()
            .create(&CreateUserRequest {
                username: name.into(),
                email: format!("{name}@example.com"),
                password: "pw1234".into(),
            })
            .unwrap()
    }

    pub fn post(db: &Database, user_id: i64, title: &str) -> Post {
        db.posts()
            .create(&CreatePostRequest {
                title: title.into(),
                post_url: "https://example.com/story".into(),
                user_id,
            })
            .unwrap()
    }
}
