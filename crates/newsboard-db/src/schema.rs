//! Tables and the foreign-key relations between them.
//!
//! Migrations create the tables; this descriptor is what the store checks
//! the live schema against at open time, and what the repositories read the
//! `voted_posts` join from.

use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::debug;

pub const USER: &str = "user";
pub const POST: &str = "post";
pub const COMMENT: &str = "comment";
pub const VOTE: &str = "vote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// SQLite's default: the parent delete fails while children exist.
    NoAction,
    Cascade,
}

impl OnDelete {
    fn as_sql(self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Cascade => "CASCADE",
        }
    }
}

/// `table.column` references `references.id`.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

impl Relation {
    pub fn index_name(&self) -> String {
        format!("idx_{}_{}", self.table, self.column)
    }
}

pub const RELATIONS: &[Relation] = &[
    Relation {
        table: POST,
        column: "user_id",
        references: USER,
        on_delete: OnDelete::NoAction,
    },
    Relation {
        table: COMMENT,
        column: "user_id",
        references: USER,
        on_delete: OnDelete::NoAction,
    },
    Relation {
        table: COMMENT,
        column: "post_id",
        references: POST,
        on_delete: OnDelete::Cascade,
    },
    Relation {
        table: VOTE,
        column: "user_id",
        references: USER,
        on_delete: OnDelete::NoAction,
    },
    Relation {
        table: VOTE,
        column: "post_id",
        references: POST,
        on_delete: OnDelete::Cascade,
    },
];

/// A many-to-many relation realised through a join table.
#[derive(Debug, Clone, Copy)]
pub struct JoinRelation {
    pub through: &'static str,
    pub left_key: &'static str,
    pub right_key: &'static str,
    pub right: &'static str,
}

/// Users <-> posts they voted for.
pub const VOTED_POSTS: JoinRelation = JoinRelation {
    through: VOTE,
    left_key: "user_id",
    right_key: "post_id",
    right: POST,
};

pub fn create_indexes(conn: &Connection) -> Result<()> {
    for rel in RELATIONS {
        conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({});",
            rel.index_name(),
            rel.table,
            rel.column
        ))?;
    }
    Ok(())
}

/// Fail if any declared relation is missing from the live schema.
pub fn verify(conn: &Connection) -> Result<()> {
    for rel in RELATIONS {
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", rel.table))?;
        let keys = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>("table")?,
                    row.get::<_, String>("from")?,
                    row.get::<_, String>("on_delete")?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let found = keys.iter().any(|(parent, from, on_delete)| {
            parent == rel.references
                && from == rel.column
                && on_delete.eq_ignore_ascii_case(rel.on_delete.as_sql())
        });
        if !found {
            bail!(
                "schema mismatch: {}.{} should reference {} (ON DELETE {})",
                rel.table,
                rel.column,
                rel.references,
                rel.on_delete.as_sql()
            );
        }
        debug!("relation {}.{} -> {} ok", rel.table, rel.column, rel.references);
    }
    Ok(())
}
