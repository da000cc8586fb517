//! User repository (数据库访问层)

use super::UserRepository;
use crate::{
    error::AppError,
    models::user::{User, UserUpdate},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, AppError> {
        // column 只来自本模块内的常量
        let query = format!("SELECT * FROM users WHERE {} = $1", column);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one("email", email).await
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<User>, AppError> {
        self.find_one("session_id", session_id).await
    }

    async fn find_by_reset_token(&self, reset_token: &str) -> Result<Option<User>, AppError> {
        self.find_one("reset_token", reset_token).await
    }

    /// 创建用户
    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let user = User::new(email, hashed_password);

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("email {} already registered", email))
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// 更新用户
    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                hashed_password = COALESCE($2, hashed_password),
                session_id = CASE WHEN $3 THEN $4 ELSE session_id END,
                reset_token = CASE WHEN $5 THEN $6 ELSE reset_token END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.hashed_password)
        .bind(update.session_id.is_some())
        .bind(update.session_id.clone().flatten())
        .bind(update.reset_token.is_some())
        .bind(update.reset_token.clone().flatten())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
