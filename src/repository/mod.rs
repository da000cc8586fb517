//! Persistence layer for users and sessions
//!
//! Two backends share the same traits: PostgreSQL (`sqlx`) for deployments and
//! an in-memory backend used by tests and by `storage = memory`.

pub mod memory;
pub mod session_repo;
pub mod user_repo;

pub use memory::{InMemorySessionRepository, InMemoryUserRepository};
pub use session_repo::PgUserSessionRepository;
pub use user_repo::PgUserRepository;

use crate::{
    error::AppError,
    models::{
        session::SessionRecord,
        user::{User, UserUpdate},
    },
};
use async_trait::async_trait;
use uuid::Uuid;

/// User credential store.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// store failures.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<User>, AppError>;

    async fn find_by_reset_token(&self, reset_token: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user. Fails with `AppError::Conflict` when the email is taken.
    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    /// Apply a partial update. Fails with `AppError::NotFound` for unknown ids.
    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<(), AppError>;
}

/// Persisted login sessions
#[async_trait]
pub trait UserSessionRepository: Send + Sync {
    async fn save(&self, record: &SessionRecord) -> Result<(), AppError>;

    async fn find_by_session_id(&self, session_id: &str)
        -> Result<Option<SessionRecord>, AppError>;

    /// Returns `true` when a record was removed
    async fn remove(&self, session_id: &str) -> Result<bool, AppError>;
}
