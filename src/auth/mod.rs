//! Authentication module

pub mod basic;
pub mod credentials;
pub mod middleware;
pub mod password;
pub mod path;
pub mod session;
pub mod session_db;
pub mod strategy;

pub use basic::BasicAuth;
pub use middleware::{auth_gate_middleware, CurrentUser};
pub use password::PasswordHasher;
pub use path::{requires_auth, ExclusionRule};
pub use session::{ExpiryPolicy, MemorySessionStore, SessionAuth, SessionExpAuth};
pub use session_db::SessionDbAuth;
pub use strategy::{build_strategy, AuthSettings, AuthStrategy, BaseAuth, StrategyDeps};
