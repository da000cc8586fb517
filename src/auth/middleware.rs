//! 认证门禁中间件

use crate::{error::AppError, middleware::AppState, models::user::User};
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 当前认证用户（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// 实现 FromRequestParts 以便在 handler 中直接提取 CurrentUser
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Forbidden)
    }
}

/// 认证门禁
///
/// 路径需要认证时：既无 Authorization 头也无会话 Cookie 返回 401，
/// 无法识别当前用户返回 403。
pub async fn auth_gate_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(strategy) = state.strategy.as_ref() else {
        return Ok(next.run(req).await);
    };

    if !strategy.require_auth(Some(req.uri().path())) {
        return Ok(next.run(req).await);
    }

    let headers = req.headers();
    if strategy.authorization_header(headers).is_none()
        && strategy.session_cookie(headers).is_none()
    {
        return Err(AppError::Unauthorized);
    }

    let user = strategy
        .current_user(headers)
        .await
        .ok_or(AppError::Forbidden)?;

    tracing::debug!(user_id = %user.id, strategy = strategy.kind(), "Request authenticated");

    // 附加到请求扩展
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
