//! Session repository (会话持久化)

use super::UserSessionRepository;
use crate::{error::AppError, models::session::SessionRecord};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgUserSessionRepository {
    db: PgPool,
}

impl PgUserSessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserSessionRepository for PgUserSessionRepository {
    /// 存储会话
    async fn save(&self, record: &SessionRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (session_id, user_id, created_at)
            VALUES ($1, $2, COALESCE($3, NOW()))
            "#,
        )
        .bind(&record.session_id)
        .bind(record.user_id)
        .bind(record.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 根据会话 ID 查找
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, AppError> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT session_id, user_id, created_at FROM user_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// 删除会话
    async fn remove(&self, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
