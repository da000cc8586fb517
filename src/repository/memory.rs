//! In-memory repositories
//!
//! Each operation takes the lock exactly once, so compound checks such as the
//! duplicate-email check in `add_user` are atomic.

use super::{UserRepository, UserSessionRepository};
use crate::{
    error::AppError,
    models::{
        session::SessionRecord,
        user::{User, UserUpdate},
    },
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_where<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        let users = self.users.read().await;
        users.values().find(|u| predicate(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.find_where(|u| u.email == email).await)
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .find_where(|u| u.session_id.as_deref() == Some(session_id))
            .await)
    }

    async fn find_by_reset_token(&self, reset_token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .find_where(|u| u.reset_token.as_deref() == Some(reset_token))
            .await)
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(format!("email {} already registered", email)));
        }

        let user = User::new(email, hashed_password);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        update.apply(user);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserSessionRepository for InMemorySessionRepository {
    async fn save(&self, record: &SessionRecord) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, AppError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, AppError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_user_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.add_user("a@b.com", "hash").await.unwrap();

        let err = repo.add_user("a@b.com", "other").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_token_columns() {
        let repo = InMemoryUserRepository::new();
        let user = repo.add_user("a@b.com", "hash").await.unwrap();

        let update = UserUpdate {
            session_id: Some(Some("sid".to_string())),
            reset_token: Some(Some("tok".to_string())),
            ..Default::default()
        };
        repo.update_user(user.id, &update).await.unwrap();

        assert_eq!(repo.find_by_session_id("sid").await.unwrap().unwrap().id, user.id);
        assert_eq!(repo.find_by_reset_token("tok").await.unwrap().unwrap().id, user.id);
        assert!(repo.find_by_session_id("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let err = repo
            .update_user(Uuid::new_v4(), &UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_session_save_find_remove() {
        let repo = InMemorySessionRepository::new();
        let record = SessionRecord::issue(Uuid::new_v4());
        repo.save(&record).await.unwrap();

        let found = repo.find_by_session_id(&record.session_id).await.unwrap();
        assert_eq!(found.unwrap().user_id, record.user_id);

        assert!(repo.remove(&record.session_id).await.unwrap());
        assert!(!repo.remove(&record.session_id).await.unwrap());
        assert!(repo.find_by_session_id(&record.session_id).await.unwrap().is_none());
    }
}
