//! Cookie session authentication
//!
//! [`SessionAuth`] keeps sessions in a process-local [`MemorySessionStore`].
//! [`SessionExpAuth`] wraps it and adds lazy expiry: expired entries stay in
//! the map and are only treated as absent when read.

use super::strategy::{AuthSettings, AuthStrategy};
use crate::{
    models::{session::SessionRecord, user::User},
    repository::UserRepository,
};
use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local session map, safe for concurrent requests
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: SessionRecord) {
        self.sessions.insert(record.session_id.clone(), record);
    }

    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Resolve the session cookie of a request to a user
pub(crate) async fn session_user<S>(
    strategy: &S,
    users: &dyn UserRepository,
    headers: &HeaderMap,
) -> Option<User>
where
    S: AuthStrategy + ?Sized,
{
    let session_id = strategy.session_cookie(headers)?;
    let user_id = strategy.user_id_for_session_id(&session_id).await?;

    match users.find_by_id(user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "User lookup failed for session");
            None
        }
    }
}

pub struct SessionAuth {
    settings: AuthSettings,
    store: Arc<MemorySessionStore>,
    users: Arc<dyn UserRepository>,
}

impl SessionAuth {
    pub fn new(
        settings: AuthSettings,
        store: Arc<MemorySessionStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            settings,
            store,
            users,
        }
    }

    pub fn store(&self) -> &Arc<MemorySessionStore> {
        &self.store
    }

    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }
}

#[async_trait]
impl AuthStrategy for SessionAuth {
    fn kind(&self) -> &'static str {
        "session_auth"
    }

    fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, self.users.as_ref(), headers).await
    }

    async fn create_session(&self, user_id: Uuid) -> Option<String> {
        let record = SessionRecord::issue(user_id);
        let session_id = record.session_id.clone();
        self.store.insert(record);

        tracing::debug!(%user_id, "Session created");
        Some(session_id)
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        self.store.get(session_id).map(|record| record.user_id)
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        let Some(session_id) = self.session_cookie(headers) else {
            return false;
        };
        self.store.remove(&session_id)
    }
}

/// Lazy expiry rule shared by the expiring strategies
#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    /// Seconds; `<= 0` disables expiry
    pub session_duration: i64,
}

impl ExpiryPolicy {
    pub fn new(session_duration: i64) -> Self {
        Self { session_duration }
    }

    pub fn expires(&self) -> bool {
        self.session_duration > 0
    }

    /// Still valid at exactly `created_at + session_duration`
    pub fn user_id_at(&self, record: &SessionRecord, now: DateTime<Utc>) -> Option<Uuid> {
        if !self.expires() {
            return Some(record.user_id);
        }

        let created_at = record.created_at?;
        // 超出 chrono 可表示范围的过期时间视为永不过期
        let expires_at = Duration::try_seconds(self.session_duration)
            .and_then(|duration| created_at.checked_add_signed(duration));
        match expires_at {
            Some(expires_at) if now > expires_at => None,
            _ => Some(record.user_id),
        }
    }
}

pub struct SessionExpAuth {
    inner: SessionAuth,
    policy: ExpiryPolicy,
}

impl SessionExpAuth {
    pub fn new(inner: SessionAuth, session_duration: i64) -> Self {
        Self {
            inner,
            policy: ExpiryPolicy::new(session_duration),
        }
    }

    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &SessionAuth {
        &self.inner
    }
}

#[async_trait]
impl AuthStrategy for SessionExpAuth {
    fn kind(&self) -> &'static str {
        "session_exp_auth"
    }

    fn settings(&self) -> &AuthSettings {
        self.inner.settings()
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, self.inner.users().as_ref(), headers).await
    }

    async fn create_session(&self, user_id: Uuid) -> Option<String> {
        self.inner.create_session(user_id).await
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        let record = self.inner.store().get(session_id)?;
        self.policy.user_id_at(&record, Utc::now())
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        self.inner.destroy_session(headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use axum::http::header::COOKIE;

    fn session_auth() -> SessionAuth {
        SessionAuth::new(
            AuthSettings::new(&[], "_my_session_id"),
            Arc::new(MemorySessionStore::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    fn cookie(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("_my_session_id={}", session_id).parse().unwrap());
        headers
    }

    fn record_at(created_at: Option<DateTime<Utc>>) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let auth = session_auth();
        let user_id = Uuid::new_v4();

        let session_id = auth.create_session(user_id).await.unwrap();
        assert!(Uuid::parse_str(&session_id).is_ok());
        assert_eq!(auth.user_id_for_session_id(&session_id).await, Some(user_id));

        assert!(auth.destroy_session(&cookie(&session_id)).await);
        assert!(auth.user_id_for_session_id(&session_id).await.is_none());
        assert!(!auth.destroy_session(&cookie(&session_id)).await);
    }

    #[tokio::test]
    async fn test_each_login_gets_a_fresh_id() {
        let auth = session_auth();
        let user_id = Uuid::new_v4();

        let first = auth.create_session(user_id).await.unwrap();
        let second = auth.create_session(user_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_destroy_without_cookie() {
        let auth = session_auth();
        assert!(!auth.destroy_session(&HeaderMap::new()).await);
        assert!(!auth.destroy_session(&cookie("unknown")).await);
    }

    #[tokio::test]
    async fn test_current_user_from_cookie() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users.add_user("a@b.com", "hash").await.unwrap();
        let auth = SessionAuth::new(
            AuthSettings::new(&[], "_my_session_id"),
            Arc::new(MemorySessionStore::new()),
            users,
        );

        let session_id = auth.create_session(user.id).await.unwrap();
        let current = auth.current_user(&cookie(&session_id)).await.unwrap();
        assert_eq!(current.id, user.id);

        assert!(auth.current_user(&cookie("unknown")).await.is_none());
        assert!(auth.current_user(&HeaderMap::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_kept() {
        let auth = Arc::new(session_auth());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let auth = auth.clone();
            handles.push(tokio::spawn(async move {
                auth.create_session(Uuid::new_v4()).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(auth.store().len(), 32);
    }

    #[test]
    fn test_expiry_boundary() {
        let policy = ExpiryPolicy::new(60);
        let t0 = Utc::now();
        let record = record_at(Some(t0));

        assert_eq!(
            policy.user_id_at(&record, t0 + Duration::seconds(59)),
            Some(record.user_id)
        );
        assert_eq!(
            policy.user_id_at(&record, t0 + Duration::seconds(60)),
            Some(record.user_id)
        );
        assert_eq!(policy.user_id_at(&record, t0 + Duration::seconds(61)), None);
    }

    #[test]
    fn test_zero_duration_never_expires() {
        let policy = ExpiryPolicy::new(0);
        let record = record_at(None);
        let later = Utc::now() + Duration::days(365);
        assert_eq!(policy.user_id_at(&record, later), Some(record.user_id));

        let policy = ExpiryPolicy::new(-5);
        assert_eq!(policy.user_id_at(&record, later), Some(record.user_id));
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        let record = SessionRecord::issue(Uuid::new_v4());
        let now = Utc::now();

        for duration in [i64::MAX, 10_000_000_000_000] {
            let policy = ExpiryPolicy::new(duration);
            assert_eq!(policy.user_id_at(&record, now), Some(record.user_id));
        }
    }

    #[test]
    fn test_missing_created_at_is_absent_when_expiring() {
        let policy = ExpiryPolicy::new(60);
        assert!(policy.user_id_at(&record_at(None), Utc::now()).is_none());
    }

    #[tokio::test]
    async fn test_exp_auth_rejects_expired_but_keeps_entry() {
        let auth = SessionExpAuth::new(session_auth(), 60);
        let stale = record_at(Some(Utc::now() - Duration::seconds(61)));
        let session_id = stale.session_id.clone();
        auth.inner().store().insert(stale);

        assert!(auth.user_id_for_session_id(&session_id).await.is_none());
        // lazy expiry: nothing is evicted
        assert!(auth.inner().store().get(&session_id).is_some());
    }

    #[tokio::test]
    async fn test_exp_auth_fresh_session() {
        let auth = SessionExpAuth::new(session_auth(), 60);
        let user_id = Uuid::new_v4();

        let session_id = auth.create_session(user_id).await.unwrap();
        assert_eq!(auth.user_id_for_session_id(&session_id).await, Some(user_id));
        assert!(auth.destroy_session(&cookie(&session_id)).await);
        assert!(auth.user_id_for_session_id(&session_id).await.is_none());
    }
}
