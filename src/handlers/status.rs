//! 状态与错误演示端点

use crate::{auth::CurrentUser, error::AppError, models::user::UserResponse};
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// 服务状态
pub async fn status() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}

pub async fn unauthorized() -> AppError {
    AppError::Unauthorized
}

pub async fn forbidden() -> AppError {
    AppError::Forbidden
}

/// `/api/v1` 下未匹配的路径（先经过认证门禁）
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// 当前用户信息
pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse::from(user))
}
