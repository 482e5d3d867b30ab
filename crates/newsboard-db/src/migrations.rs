use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::schema;

/// Bring the schema up to date. Never drops anything: an existing store keeps
/// its rows and only gains what is missing.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS user (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS post (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                post_url    TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES user(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS comment (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                comment_text  TEXT NOT NULL,
                user_id       INTEGER NOT NULL REFERENCES user(id),
                post_id       INTEGER NOT NULL REFERENCES post(id) ON DELETE CASCADE,
                created_at    TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS vote (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES user(id),
                post_id     INTEGER NOT NULL REFERENCES post(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, post_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    schema::create_indexes(conn)?;
    schema::verify(conn)?;

    info!("Database migrations complete");
    Ok(())
}
