//! Authentication strategies
//!
//! Every strategy answers the same questions: does a path need
//! authentication, who is the caller, and how are sessions created and
//! destroyed. The trait's provided methods are the base behaviour
//! (authentication enabled, nobody ever authenticated, no sessions).
//!
//! | `AUTH_TYPE`        | Implementation   |
//! |--------------------|------------------|
//! | `none`             | no gate          |
//! | `auth`             | [`BaseAuth`]     |
//! | `basic_auth`       | [`BasicAuth`]    |
//! | `session_auth`     | [`SessionAuth`]  |
//! | `session_exp_auth` | [`SessionExpAuth`] |
//! | `session_db_auth`  | [`SessionDbAuth`]  |

use super::{
    basic::BasicAuth,
    credentials,
    path::{requires_auth, ExclusionRule},
    password::PasswordHasher,
    session::{MemorySessionStore, SessionAuth, SessionExpAuth},
    session_db::SessionDbAuth,
};
use crate::{
    config::AuthConfig,
    error::AppError,
    models::user::User,
    repository::{UserRepository, UserSessionRepository},
};
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;
use uuid::Uuid;

/// Settings shared by every strategy, fixed at construction
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub exclusions: Vec<ExclusionRule>,
    pub session_name: String,
}

impl AuthSettings {
    pub fn new(excluded_paths: &[String], session_name: &str) -> Self {
        Self {
            exclusions: ExclusionRule::parse_all(excluded_paths),
            session_name: session_name.to_string(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.excluded_paths, &config.session_name)
    }
}

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// `AUTH_TYPE` name of the strategy
    fn kind(&self) -> &'static str;

    fn settings(&self) -> &AuthSettings;

    fn require_auth(&self, path: Option<&str>) -> bool {
        requires_auth(path, &self.settings().exclusions)
    }

    fn authorization_header(&self, headers: &HeaderMap) -> Option<String> {
        credentials::authorization_header(headers)
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        credentials::session_cookie(headers, &self.settings().session_name)
    }

    async fn current_user(&self, _headers: &HeaderMap) -> Option<User> {
        None
    }

    /// Mint a session for `user_id`; `None` when the strategy has no sessions
    async fn create_session(&self, _user_id: Uuid) -> Option<String> {
        None
    }

    async fn user_id_for_session_id(&self, _session_id: &str) -> Option<Uuid> {
        None
    }

    /// Destroy the session named by the request cookie
    async fn destroy_session(&self, _headers: &HeaderMap) -> bool {
        false
    }
}

/// Authentication required everywhere outside the exclusions, nobody authenticated
pub struct BaseAuth {
    settings: AuthSettings,
}

impl BaseAuth {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AuthStrategy for BaseAuth {
    fn kind(&self) -> &'static str {
        "auth"
    }

    fn settings(&self) -> &AuthSettings {
        &self.settings
    }
}

/// Collaborators a strategy may need
#[derive(Clone)]
pub struct StrategyDeps {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn UserSessionRepository>,
    pub hasher: Arc<PasswordHasher>,
}

/// Build the configured strategy. `Ok(None)` means no gate at all.
pub fn build_strategy(
    config: &AuthConfig,
    deps: StrategyDeps,
) -> Result<Option<Arc<dyn AuthStrategy>>, AppError> {
    let settings = AuthSettings::from_config(config);

    let session_auth = || {
        SessionAuth::new(
            settings.clone(),
            Arc::new(MemorySessionStore::new()),
            deps.users.clone(),
        )
    };

    let strategy: Arc<dyn AuthStrategy> = match config.strategy.as_str() {
        "none" => return Ok(None),
        "auth" => Arc::new(BaseAuth::new(settings.clone())),
        "basic_auth" => Arc::new(BasicAuth::new(
            settings.clone(),
            deps.users.clone(),
            deps.hasher.clone(),
        )),
        "session_auth" => Arc::new(session_auth()),
        "session_exp_auth" => Arc::new(SessionExpAuth::new(
            session_auth(),
            config.session_duration,
        )),
        "session_db_auth" => Arc::new(SessionDbAuth::new(
            SessionExpAuth::new(session_auth(), config.session_duration),
            deps.sessions.clone(),
        )),
        other => {
            return Err(AppError::Config(format!("Unknown auth strategy: {}", other)));
        }
    };

    tracing::info!(
        strategy = strategy.kind(),
        session_name = %config.session_name,
        session_duration = config.session_duration,
        "Auth strategy selected"
    );

    Ok(Some(strategy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemorySessionRepository, InMemoryUserRepository};
    use axum::http::header::COOKIE;

    fn deps() -> StrategyDeps {
        StrategyDeps {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            hasher: Arc::new(PasswordHasher::new()),
        }
    }

    fn config(strategy: &str) -> AuthConfig {
        AuthConfig {
            strategy: strategy.to_string(),
            session_name: "_my_session_id".to_string(),
            session_duration: 0,
            excluded_paths: vec!["/api/v1/status/".to_string()],
            storage: "memory".to_string(),
        }
    }

    #[test]
    fn test_build_each_strategy() {
        assert!(build_strategy(&config("none"), deps()).unwrap().is_none());

        for name in [
            "auth",
            "basic_auth",
            "session_auth",
            "session_exp_auth",
            "session_db_auth",
        ] {
            let strategy = build_strategy(&config(name), deps()).unwrap().unwrap();
            assert_eq!(strategy.kind(), name);
        }
    }

    #[test]
    fn test_build_unknown_strategy_fails() {
        assert!(build_strategy(&config("oauth"), deps()).is_err());
    }

    #[tokio::test]
    async fn test_base_auth_never_authenticates() {
        let strategy = BaseAuth::new(AuthSettings::new(
            &["/api/v1/status/".to_string()],
            "_my_session_id",
        ));

        assert!(!strategy.require_auth(Some("/api/v1/status")));
        assert!(strategy.require_auth(Some("/api/v1/users")));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "_my_session_id=abc".parse().unwrap());
        assert_eq!(strategy.session_cookie(&headers).as_deref(), Some("abc"));
        assert!(strategy.current_user(&headers).await.is_none());
        assert!(strategy.create_session(Uuid::new_v4()).await.is_none());
        assert!(!strategy.destroy_session(&headers).await);
    }
}
