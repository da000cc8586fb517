//! 账户服务：注册、登录校验、会话与密码重置

use crate::{
    auth::password::PasswordHasher,
    error::{AccountError, AppError},
    models::user::{User, UserUpdate},
    repository::UserRepository,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// 注册用户
    pub async fn register_user(&self, email: &str, password: &str) -> Result<User, AccountError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AccountError::UserExists(email.to_string()));
        }

        let hashed_password = self.hasher.hash(password)?;

        // 并发注册时由存储层的唯一约束兜底
        let user = self
            .users
            .add_user(email, &hashed_password)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AccountError::UserExists(email.to_string()),
                other => AccountError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// 校验登录凭据
    pub async fn valid_login(&self, email: &str, password: &str) -> bool {
        match self.users.find_by_email(email).await {
            Ok(Some(user)) => self.hasher.verify(&user.hashed_password, password),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed during login");
                false
            }
        }
    }

    /// 为用户生成会话 ID 并保存到用户记录
    pub async fn create_session(&self, email: &str) -> Result<Option<String>, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };

        let session_id = Uuid::new_v4().to_string();
        let update = UserUpdate {
            session_id: Some(Some(session_id.clone())),
            ..Default::default()
        };
        self.users.update_user(user.id, &update).await?;

        Ok(Some(session_id))
    }

    /// 根据会话 ID 获取用户
    pub async fn get_user_from_session_id(&self, session_id: Option<&str>) -> Option<User> {
        let session_id = session_id?;
        match self.users.find_by_session_id(session_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup by session failed");
                None
            }
        }
    }

    /// 销毁会话；用户不存在时静默返回
    pub async fn destroy_session(&self, user_id: Uuid) -> Result<(), AppError> {
        let update = UserUpdate {
            session_id: Some(None),
            ..Default::default()
        };
        match self.users.update_user(user_id, &update).await {
            Ok(()) | Err(AppError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// 生成密码重置令牌
    pub async fn get_reset_password_token(&self, email: &str) -> Result<String, AccountError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AccountError::UserNotFound(email.to_string()))?;

        let reset_token = Uuid::new_v4().to_string();
        let update = UserUpdate {
            reset_token: Some(Some(reset_token.clone())),
            ..Default::default()
        };
        self.users.update_user(user.id, &update).await?;

        Ok(reset_token)
    }

    /// 使用重置令牌更新密码，令牌随即失效
    pub async fn update_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let user = self
            .users
            .find_by_reset_token(reset_token)
            .await?
            .ok_or(AccountError::InvalidResetToken)?;

        let update = UserUpdate {
            hashed_password: Some(self.hasher.hash(password)?),
            reset_token: Some(None),
            ..Default::default()
        };
        self.users.update_user(user.id, &update).await?;

        tracing::info!(user_id = %user.id, "Password updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(PasswordHasher::new()),
        )
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();
        let user = auth.register_user("x@y.com", "pw").await.unwrap();
        assert_eq!(user.email, "x@y.com");
        assert_ne!(user.hashed_password, "pw");

        let err = auth.register_user("x@y.com", "pw2").await.unwrap_err();
        assert!(matches!(err, AccountError::UserExists(ref email) if email == "x@y.com"));
    }

    #[tokio::test]
    async fn test_valid_login() {
        let auth = service();
        auth.register_user("x@y.com", "pw").await.unwrap();

        assert!(auth.valid_login("x@y.com", "pw").await);
        assert!(!auth.valid_login("x@y.com", "nope").await);
        assert!(!auth.valid_login("unknown@y.com", "pw").await);
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let auth = service();
        let user = auth.register_user("x@y.com", "pw").await.unwrap();

        assert!(auth.create_session("unknown@y.com").await.unwrap().is_none());

        let session_id = auth.create_session("x@y.com").await.unwrap().unwrap();
        let found = auth.get_user_from_session_id(Some(&session_id)).await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(auth.get_user_from_session_id(None).await.is_none());

        auth.destroy_session(user.id).await.unwrap();
        assert!(auth.get_user_from_session_id(Some(&session_id)).await.is_none());

        // unknown user is a no-op
        auth.destroy_session(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_token_unknown_email() {
        let auth = service();
        let err = auth.get_reset_password_token("ghost@y.com").await.unwrap_err();
        assert_eq!(err.to_string(), "User ghost@y.com does not exist");
    }

    #[tokio::test]
    async fn test_reset_token_is_single_use() {
        let auth = service();
        auth.register_user("x@y.com", "old").await.unwrap();

        let token = auth.get_reset_password_token("x@y.com").await.unwrap();
        auth.update_password(&token, "new").await.unwrap();

        assert!(auth.valid_login("x@y.com", "new").await);
        assert!(!auth.valid_login("x@y.com", "old").await);

        let err = auth.update_password(&token, "again").await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidResetToken));
    }

    #[tokio::test]
    async fn test_update_password_unknown_token() {
        let auth = service();
        let err = auth.update_password("bogus", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid reset token");
    }
}
