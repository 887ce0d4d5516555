use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User row joined with its profile and department names. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub profile_id: i32,
    pub profile_name: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What login needs: the stored hash plus the claims that go into the token.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_id: i32,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_id: i32,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub name: String,
    pub email: String,
    pub profile_id: i32,
    pub department_id: Option<i32>,
}
