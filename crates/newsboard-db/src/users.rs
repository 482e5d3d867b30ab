use newsboard_types::api::{
    CreateUserRequest, PostTitle, UpdateUserRequest, UserComment, UserDetail, UserPost, VotedPost,
};
use newsboard_types::models::User;
use rusqlite::{Connection, OptionalExtension, ToSql};
use tracing::debug;

use crate::error::Result;
use crate::models::UserRow;
use crate::schema::VOTED_POSTS;
use crate::{Database, password, timestamp};

/// Repository for `user` rows.
pub struct Users<'a> {
    db: &'a Database,
}

impl<'a> Users<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every user, password excluded.
    pub fn list(&self) -> Result<Vec<User>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, username, email, created_at FROM user ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        created_at: timestamp(row, 3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One user with their posts, comments and voted posts.
    pub fn get(&self, id: i64) -> Result<Option<UserDetail>> {
        self.db.with_conn(|conn| {
            let Some(row) = query_user(conn, "id = ?1", &id)? else {
                return Ok(None);
            };

            Ok(Some(UserDetail {
                user: row.into_user(),
                posts: query_authored_posts(conn, id)?,
                comments: query_comments(conn, id)?,
                voted_posts: query_voted_posts(conn, id)?,
            }))
        })
    }

    /// Validate, hash the password, insert.
    pub fn create(&self, req: &CreateUserRequest) -> Result<User> {
        req.validate()?;
        let password_hash = password::hash(&req.password)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
                (&req.username, &req.email, &password_hash),
            )?;
            let id = conn.last_insert_rowid();
            debug!("Created user {} ({})", id, req.username);

            let row = query_user(conn, "id = ?1", &id)?
                .ok_or_else(|| anyhow::anyhow!("user {id} vanished after insert"))?;
            Ok(row.into_user())
        })
    }

    /// Full row including the hash. Only login should need this.
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.db.with_conn(|conn| query_user(conn, "email = ?1", &email))
    }

    /// Apply the fields present in `req`. A new password is hashed here,
    /// once. Returns the number of rows matched (0 or 1).
    pub fn update(&self, id: i64, req: &UpdateUserRequest) -> Result<usize> {
        req.validate()?;
        let password_hash = req.password.as_deref().map(password::hash).transpose()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();
        if let Some(username) = &req.username {
            sets.push("username");
            params.push(username);
        }
        if let Some(email) = &req.email {
            sets.push("email");
            params.push(email);
        }
        if let Some(hash) = &password_hash {
            sets.push("password");
            params.push(hash);
        }

        let assignments: Vec<String> = sets
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect();
        let sql = format!(
            "UPDATE user SET {} WHERE id = ?{}",
            assignments.join(", "),
            params.len() + 1
        );
        params.push(&id);

        self.db
            .with_conn(|conn| Ok(conn.execute(&sql, params.as_slice())?))
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        self.db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM user WHERE id = ?1", [id])?))
    }
}

fn query_user(conn: &Connection, filter: &str, value: &dyn ToSql) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, created_at FROM user WHERE {filter}"
    ))?;

    let row = stmt
        .query_row(&[value][..], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: timestamp(row, 4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_authored_posts(conn: &Connection, user_id: i64) -> Result<Vec<UserPost>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, post_url, created_at FROM post WHERE user_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(UserPost {
                id: row.get(0)?,
                title: row.get(1)?,
                post_url: row.get(2)?,
                created_at: timestamp(row, 3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_comments(conn: &Connection, user_id: i64) -> Result<Vec<UserComment>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.comment_text, c.created_at, p.title
         FROM comment c
         JOIN post p ON c.post_id = p.id
         WHERE c.user_id = ?1
         ORDER BY c.id",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(UserComment {
                id: row.get(0)?,
                comment_text: row.get(1)?,
                created_at: timestamp(row, 2)?,
                post: PostTitle { title: row.get(3)? },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_voted_posts(conn: &Connection, user_id: i64) -> Result<Vec<VotedPost>> {
    let rel = VOTED_POSTS;
    let mut stmt = conn.prepare(&format!(
        "SELECT p.id, p.title
         FROM {through} j
         JOIN {right} p ON j.{right_key} = p.id
         WHERE j.{left_key} = ?1
         ORDER BY j.id",
        through = rel.through,
        right = rel.right,
        right_key = rel.right_key,
        left_key = rel.left_key,
    ))?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(VotedPost {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use newsboard_types::ValidationError;
    use newsboard_types::api::{CreateCommentRequest, UpvoteRequest};

    use super::*;
    use crate::DbError;
    use crate::test_support::{db, post, user};

    fn alice() -> CreateUserRequest {
        CreateUserRequest {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "pw1234".into(),
        }
    }

    #[test]
    fn create_stores_only_a_hash() {
        let db = db();
        let created = db.users().create(&alice()).unwrap();
        assert!(created.id > 0);

        let row = db.users().find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(row.id, created.id);
        assert_ne!(row.password, "pw1234");
        assert!(password::verify("pw1234", &row.password).unwrap());
        assert!(!password::verify("pw12345", &row.password).unwrap());
    }

    #[test]
    fn invalid_input_never_reaches_the_store() {
        let db = db();
        let mut req = alice();
        req.email = "not-an-email".into();
        assert!(matches!(
            db.users().create(&req),
            Err(DbError::Validation(ValidationError::InvalidEmail))
        ));

        let mut req = alice();
        req.password = "abc".into();
        assert!(matches!(
            db.users().create(&req),
            Err(DbError::Validation(ValidationError::PasswordTooShort))
        ));

        assert!(db.users().list().unwrap().is_empty());
    }

    #[test]
    fn duplicate_email_is_reported() {
        let db = db();
        db.users().create(&alice()).unwrap();
        match db.users().create(&alice()) {
            Err(DbError::Duplicate(msg)) => assert_eq!(msg, "email must be unique"),
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn get_missing_is_none() {
        let db = db();
        assert!(db.users().get(42).unwrap().is_none());
    }

    #[test]
    fn get_loads_relations() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let bobs_post = post(&db, bob.id, "Bob's story");
        let alices_post = post(&db, alice.id, "Alice's story");

        db.comments()
            .create(&CreateCommentRequest {
                comment_text: "Nice".into(),
                user_id: alice.id,
                post_id: bobs_post.id,
            })
            .unwrap();
        db.votes()
            .upvote(&UpvoteRequest {
                user_id: alice.id,
                post_id: bobs_post.id,
            })
            .unwrap();

        let detail = db.users().get(alice.id).unwrap().unwrap();
        assert_eq!(detail.user.username, "alice");
        assert_eq!(detail.posts.len(), 1);
        assert_eq!(detail.posts[0].id, alices_post.id);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].post.title, "Bob's story");
        assert_eq!(detail.voted_posts.len(), 1);
        assert_eq!(detail.voted_posts[0].id, bobs_post.id);

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn update_rehashes_password_once() {
        let db = db();
        let created = db.users().create(&alice()).unwrap();
        let before = db.users().find_by_email("alice@example.com").unwrap().unwrap();

        let changed = db
            .users()
            .update(
                created.id,
                &UpdateUserRequest {
                    password: Some("new-secret".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(changed, 1);

        let after = db.users().find_by_email("alice@example.com").unwrap().unwrap();
        assert_ne!(after.password, before.password);
        assert!(password::verify("new-secret", &after.password).unwrap());
        assert!(!password::verify("pw1234", &after.password).unwrap());
    }

    #[test]
    fn update_without_password_keeps_hash() {
        let db = db();
        let created = db.users().create(&alice()).unwrap();
        let before = db.users().find_by_email("alice@example.com").unwrap().unwrap();

        db.users()
            .update(
                created.id,
                &UpdateUserRequest {
                    username: Some("alicia".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let after = db.users().find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(after.username, "alicia");
        assert_eq!(after.password, before.password);
    }

    #[test]
    fn update_and_delete_missing_match_nothing() {
        let db = db();
        let rename = UpdateUserRequest {
            username: Some("ghost".into()),
            ..Default::default()
        };
        assert_eq!(db.users().update(7, &rename).unwrap(), 0);
        assert_eq!(db.users().delete(7).unwrap(), 0);
    }

    #[test]
    fn delete_removes_row() {
        let db = db();
        let created = db.users().create(&alice()).unwrap();
        assert_eq!(db.users().delete(created.id).unwrap(), 1);
        assert!(db.users().get(created.id).unwrap().is_none());
    }

    #[test]
    fn delete_with_posts_is_refused_by_the_store() {
        let db = db();
        let alice = user(&db, "alice");
        post(&db, alice.id, "Still here");
        assert!(matches!(db.users().delete(alice.id), Err(DbError::Sqlite(_))));
    }
}
