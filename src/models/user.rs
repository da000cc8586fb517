//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User credential record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,

    // At most one account-service login and one reset token at a time
    pub session_id: Option<String>,
    pub reset_token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            session_id: None,
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a user row.
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub hashed_password: Option<String>,
    pub session_id: Option<Option<String>>,
    pub reset_token: Option<Option<String>>,
}

impl UserUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(hash) = &self.hashed_password {
            user.hashed_password = hash.clone();
        }
        if let Some(session_id) = &self.session_id {
            user.session_id = session_id.clone();
        }
        if let Some(reset_token) = &self.reset_token {
            user.reset_token = reset_token.clone();
        }
        user.updated_at = Utc::now();
    }
}

/// User response (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
