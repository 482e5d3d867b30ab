use newsboard_types::ValidationError;
use newsboard_types::api::UpvoteRequest;
use newsboard_types::models::Vote;
use rusqlite::OptionalExtension;
use tracing::debug;

use crate::error::{DbError, Result};
use crate::schema::{POST, USER};
use crate::{Database, row_exists, timestamp};

/// Repository for `vote` rows.
pub struct Votes<'a> {
    db: &'a Database,
}

impl<'a> Votes<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a vote. A second vote by the same user on the same post is
    /// refused rather than counted again.
    pub fn upvote(&self, req: &UpvoteRequest) -> Result<Vote> {
        self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !row_exists(&tx, USER, req.user_id)? {
                return Err(ValidationError::UnknownReference("user_id").into());
            }
            if !row_exists(&tx, POST, req.post_id)? {
                return Err(ValidationError::UnknownReference("post_id").into());
            }

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM vote WHERE user_id = ?1 AND post_id = ?2",
                    (req.user_id, req.post_id),
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(DbError::Duplicate("Already voted for this post".into()));
            }

            tx.execute(
                "INSERT INTO vote (user_id, post_id) VALUES (?1, ?2)",
                (req.user_id, req.post_id),
            )?;
            let id = tx.last_insert_rowid();
            let vote = tx.query_row(
                "SELECT id, user_id, post_id, created_at FROM vote WHERE id = ?1",
                [id],
                |row| {
                    Ok(Vote {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        post_id: row.get(2)?,
                        created_at: timestamp(row, 3)?,
                    })
                },
            )?;
            tx.commit()?;

            debug!("User {} voted for post {}", req.user_id, req.post_id);
            Ok(vote)
        })
    }

    pub fn count_for_post(&self, post_id: i64) -> Result<i64> {
        self.db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM vote WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?)
        })
    }
}
