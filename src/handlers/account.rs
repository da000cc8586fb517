//! 账户端点：注册、登录会话、个人信息与密码重置
//!
//! 会话 ID 保存在用户记录中，Cookie 名固定为 `session_id`。

use super::session_auth::session_cookie_header;
use crate::{
    auth::credentials::session_cookie,
    error::{AccountError, AppError},
    middleware::AppState,
    models::auth::{LoginForm, RegisterForm, ResetTokenForm, UpdatePasswordForm},
    models::user::User,
    redact::redact_pii,
};
use axum::{
    extract::State,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;

pub const ACCOUNT_SESSION_COOKIE: &str = "session_id";

async fn session_owner(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let session_id = session_cookie(headers, ACCOUNT_SESSION_COOKIE);
    state
        .auth_service
        .get_user_from_session_id(session_id.as_deref())
        .await
}

pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Bienvenue" }))
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match state
        .auth_service
        .register_user(&form.email, &form.password)
        .await
    {
        Ok(user) => Ok(Json(json!({
            "email": user.email,
            "message": "user created"
        }))
        .into_response()),
        Err(AccountError::UserExists(_)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "email already registered" })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// 登录并设置 `session_id` Cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let (Some(email), Some(password)) = (form.email, form.password) else {
        return Err(AppError::Unauthorized);
    };

    tracing::debug!(
        form = %redact_pii(&format!("email={};password={};", email, password)),
        "Account login attempt"
    );

    if !state.auth_service.valid_login(&email, &password).await {
        return Err(AppError::Unauthorized);
    }

    let session_id = state
        .auth_service
        .create_session(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let cookie = session_cookie_header(ACCOUNT_SESSION_COOKIE, &session_id)?;
    let mut response = Json(json!({ "email": email, "message": "logged in" })).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// 登出后重定向到首页
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = session_owner(&state, &headers)
        .await
        .ok_or(AppError::Forbidden)?;

    state.auth_service.destroy_session(user.id).await?;

    Ok((StatusCode::FOUND, [(LOCATION, "/")]).into_response())
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user = session_owner(&state, &headers)
        .await
        .ok_or(AppError::Forbidden)?;

    Ok(Json(json!({ "email": user.email })))
}

/// 申请密码重置令牌
pub async fn get_reset_password_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetTokenForm>,
) -> Result<impl IntoResponse, AppError> {
    let reset_token = state
        .auth_service
        .get_reset_password_token(&form.email)
        .await
        .map_err(forbid_account_error)?;

    Ok(Json(json!({
        "email": form.email,
        "reset_token": reset_token
    })))
}

/// 使用重置令牌更新密码
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .update_password(&form.reset_token, &form.new_password)
        .await
        .map_err(forbid_account_error)?;

    Ok(Json(json!({
        "email": form.email,
        "message": "Password updated"
    })))
}

/// 账户类错误一律 403，存储错误保留原状态码
fn forbid_account_error(e: AccountError) -> AppError {
    match e {
        AccountError::Store(inner) => inner,
        other => {
            tracing::debug!(error = %other, "Account request rejected");
            AppError::Forbidden
        }
    }
}
