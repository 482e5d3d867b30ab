//! Database row types. Distinct from the newsboard-types records; only
//! `UserRow` carries the password hash.

use chrono::{DateTime, Utc};
use newsboard_types::models::User;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}
