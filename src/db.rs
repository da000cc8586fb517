//! 存储后端初始化
//! 按配置创建 PostgreSQL 连接池（含迁移）或内存仓库

use crate::{
    config::{AppConfig, DatabaseConfig},
    repository::{
        InMemorySessionRepository, InMemoryUserRepository, PgUserRepository,
        PgUserSessionRepository, UserRepository, UserSessionRepository,
    },
};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};

/// 用户与会话仓库
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn UserSessionRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgUserSessionRepository::new(pool)),
        }
    }
}

/// 根据 `auth.storage` 创建仓库
pub async fn init_repositories(config: &AppConfig) -> Result<Repositories, DbError> {
    match config.auth.storage.as_str() {
        "postgres" => {
            let pool = create_pool(&config.database).await?;
            run_migrations(&pool).await?;
            Ok(Repositories::postgres(pool))
        }
        _ => {
            tracing::warn!("Using in-memory storage, users and sessions are lost on restart");
            Ok(Repositories::in_memory())
        }
    }
}

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    tracing::debug!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database pool: {}", e);
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool created successfully"
    );

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            DbError::MigrationFailed(e.to_string())
        })?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
