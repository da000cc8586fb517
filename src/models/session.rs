//! Session domain models

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A login session as held by a session store
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Mint a fresh record with a random UUID v4 identifier
    pub fn issue(user_id: Uuid) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            created_at: Some(Utc::now()),
        }
    }
}
