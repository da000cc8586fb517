//! Persisted session authentication
//!
//! The session repository is the only session state of this strategy. The
//! wrapped strategy's in-memory map is never written, so it cannot grow
//! with logins it would never read back.

use super::{
    session::{session_user, ExpiryPolicy, SessionExpAuth},
    strategy::{AuthSettings, AuthStrategy},
};
use crate::{
    models::{session::SessionRecord, user::User},
    repository::UserSessionRepository,
};
use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct SessionDbAuth {
    inner: SessionExpAuth,
    sessions: Arc<dyn UserSessionRepository>,
}

impl SessionDbAuth {
    pub fn new(inner: SessionExpAuth, sessions: Arc<dyn UserSessionRepository>) -> Self {
        Self { inner, sessions }
    }

    fn policy(&self) -> ExpiryPolicy {
        self.inner.policy()
    }
}

#[async_trait]
impl AuthStrategy for SessionDbAuth {
    fn kind(&self) -> &'static str {
        "session_db_auth"
    }

    fn settings(&self) -> &AuthSettings {
        self.inner.settings()
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, self.inner.inner().users().as_ref(), headers).await
    }

    async fn create_session(&self, user_id: Uuid) -> Option<String> {
        let record = SessionRecord::issue(user_id);
        if let Err(e) = self.sessions.save(&record).await {
            tracing::error!(error = %e, %user_id, "Failed to persist session");
            return None;
        }

        tracing::debug!(%user_id, "Session persisted");
        Some(record.session_id)
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        let record = match self.sessions.find_by_session_id(session_id).await {
            Ok(record) => record?,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                return None;
            }
        };

        self.policy().user_id_at(&record, Utc::now())
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        let Some(session_id) = self.session_cookie(headers) else {
            return false;
        };

        match self.sessions.remove(&session_id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to remove session");
                false
            }
        }
    }
}
