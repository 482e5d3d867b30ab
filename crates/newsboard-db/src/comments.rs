use newsboard_types::ValidationError;
use newsboard_types::api::CreateCommentRequest;
use newsboard_types::models::Comment;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::schema::{POST, USER};
use crate::{Database, row_exists, timestamp};

const COLUMNS: &str = "id, comment_text, user_id, post_id, created_at, updated_at";

/// Repository for `comment` rows.
pub struct Comments<'a> {
    db: &'a Database,
}

impl<'a> Comments<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<Comment>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM comment ORDER BY id"))?;
            let rows = stmt
                .query_map([], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create(&self, req: &CreateCommentRequest) -> Result<Comment> {
        req.validate()?;

        self.db.with_conn(|conn| {
            if !row_exists(conn, USER, req.user_id)? {
                return Err(ValidationError::UnknownReference("user_id").into());
            }
            if !row_exists(conn, POST, req.post_id)? {
                return Err(ValidationError::UnknownReference("post_id").into());
            }

            conn.execute(
                "INSERT INTO comment (comment_text, user_id, post_id) VALUES (?1, ?2, ?3)",
                (&req.comment_text, req.user_id, req.post_id),
            )?;
            let id = conn.last_insert_rowid();

            query_comment(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("comment {id} vanished after insert").into())
        })
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        self.db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM comment WHERE id = ?1", [id])?))
    }
}

fn query_comment(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM comment WHERE id = ?1"),
            [id],
            map_comment,
        )
        .optional()?;
    Ok(row)
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        comment_text: row.get(1)?,
        user_id: row.get(2)?,
        post_id: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;
    use crate::test_support::{db, post, user};

    #[test]
    fn create_list_delete() {
        let db = db();
        let alice = user(&db, "alice");
        let story = post(&db, alice.id, "Story");

        let comment = db
            .comments()
            .create(&CreateCommentRequest {
                comment_text: "Great read".into(),
                user_id: alice.id,
                post_id: story.id,
            })
            .unwrap();
        assert_eq!(comment.post_id, story.id);
        assert_eq!(db.comments().list().unwrap(), vec![comment.clone()]);

        assert_eq!(db.comments().delete(comment.id).unwrap(), 1);
        assert_eq!(db.comments().delete(comment.id).unwrap(), 0);
        assert!(db.comments().list().unwrap().is_empty());
    }

    #[test]
    fn rejects_blank_text_and_dangling_post() {
        let db = db();
        let alice = user(&db, "alice");

        let blank = CreateCommentRequest {
            comment_text: "  ".into(),
            user_id: alice.id,
            post_id: 1,
        };
        assert!(matches!(
            db.comments().create(&blank),
            Err(DbError::Validation(ValidationError::Required("comment_text")))
        ));

        let dangling = CreateCommentRequest {
            comment_text: "Hello?".into(),
            user_id: alice.id,
            post_id: 404,
        };
        assert!(matches!(
            db.comments().create(&dangling),
            Err(DbError::Validation(ValidationError::UnknownReference("post_id")))
        ));
    }

    #[test]
    fn deleting_a_post_removes_its_comments() {
        let db = db();
        let alice = user(&db, "alice");
        let story = post(&db, alice.id, "Story");
        db.comments()
            .create(&CreateCommentRequest {
                comment_text: "bye".into(),
                user_id: alice.id,
                post_id: story.id,
            })
            .unwrap();

        db.posts().delete(story.id).unwrap();
        assert!(db.comments().list().unwrap().is_empty());
    }
}
