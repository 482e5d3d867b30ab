use std::collections::HashMap;

use newsboard_types::ValidationError;
use newsboard_types::api::{Author, CreatePostRequest, PostComment, PostSummary, UpdatePostRequest};
use newsboard_types::models::Post;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::Result;
use crate::schema::USER;
use crate::{Database, row_exists, timestamp};

/// Repository for `post` rows.
pub struct Posts<'a> {
    db: &'a Database,
}

impl<'a> Posts<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every post, newest first, with its vote tally, author and comments.
    pub fn list_with_vote_counts(&self) -> Result<Vec<PostSummary>> {
        self.db.with_conn(|conn| query_summaries(conn, None))
    }

    pub fn get_with_vote_count(&self, id: i64) -> Result<Option<PostSummary>> {
        self.db
            .with_conn(|conn| Ok(query_summaries(conn, Some(id))?.into_iter().next()))
    }

    pub fn get(&self, id: i64) -> Result<Option<Post>> {
        self.db.with_conn(|conn| query_post(conn, id))
    }

    pub fn create(&self, req: &CreatePostRequest) -> Result<Post> {
        let post_url = req.validate()?;

        self.db.with_conn(|conn| {
            if !row_exists(conn, USER, req.user_id)? {
                return Err(ValidationError::UnknownReference("user_id").into());
            }

            conn.execute(
                "INSERT INTO post (title, post_url, user_id) VALUES (?1, ?2, ?3)",
                (&req.title, post_url.as_str(), req.user_id),
            )?;
            let id = conn.last_insert_rowid();
            debug!("Created post {} by user {}", id, req.user_id);

            query_post(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("post {id} vanished after insert").into())
        })
    }

    /// Returns the number of rows matched.
    pub fn update_title(&self, id: i64, req: &UpdatePostRequest) -> Result<usize> {
        req.validate()?;
        self.db.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE post SET title = ?1, updated_at = datetime('now') WHERE id = ?2",
                (&req.title, id),
            )?)
        })
    }

    /// Comments and votes on the post go with it.
    pub fn delete(&self, id: i64) -> Result<usize> {
        self.db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM post WHERE id = ?1", [id])?))
    }
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<Post>> {
    let row = conn
        .query_row(
            "SELECT id, title, post_url, user_id, created_at, updated_at FROM post WHERE id = ?1",
            [id],
            |row| {
                Ok(Post {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    post_url: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: timestamp(row, 4)?,
                    updated_at: timestamp(row, 5)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// `only` restricts to a single post; `None` loads all of them.
fn query_summaries(conn: &Connection, only: Option<i64>) -> Result<Vec<PostSummary>> {
    // Vote tally as a correlated subquery so the post rows are not multiplied
    // by the vote join.
    let mut stmt = conn.prepare(
        "SELECT p.id, p.post_url, p.title, p.created_at,
                (SELECT COUNT(*) FROM vote v WHERE v.post_id = p.id) AS vote_count,
                u.username
         FROM post p
         JOIN user u ON p.user_id = u.id
         WHERE ?1 IS NULL OR p.id = ?1
         ORDER BY p.created_at DESC, p.id DESC",
    )?;

    let mut posts = stmt
        .query_map([only], |row| {
            Ok(PostSummary {
                id: row.get(0)?,
                post_url: row.get(1)?,
                title: row.get(2)?,
                created_at: timestamp(row, 3)?,
                vote_count: row.get(4)?,
                comments: Vec::new(),
                user: Author { username: row.get(5)? },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if posts.is_empty() {
        return Ok(posts);
    }

    // One query for every comment, JOIN users for the commenter's name, then
    // group in memory (avoids a query per post).
    let mut stmt = conn.prepare(
        "SELECT c.id, c.comment_text, c.post_id, c.user_id, c.created_at, u.username
         FROM comment c
         JOIN user u ON c.user_id = u.id
         WHERE ?1 IS NULL OR c.post_id = ?1
         ORDER BY c.created_at, c.id",
    )?;
    let comments = stmt
        .query_map([only], |row| {
            Ok(PostComment {
                id: row.get(0)?,
                comment_text: row.get(1)?,
                post_id: row.get(2)?,
                user_id: row.get(3)?,
                created_at: timestamp(row, 4)?,
                user: Author { username: row.get(5)? },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut by_post: HashMap<i64, Vec<PostComment>> = HashMap::new();
    for comment in comments {
        by_post.entry(comment.post_id).or_default().push(comment);
    }
    for post in &mut posts {
        post.comments = by_post.remove(&post.id).unwrap_or_default();
    }

    Ok(posts)
}
