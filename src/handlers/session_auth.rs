//! 会话登录与登出

use crate::{
    error::{AppError, ErrorResponse},
    middleware::AppState,
    models::{auth::LoginForm, user::UserResponse},
    redact::redact_pii,
};
use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;

fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// 空白字段视为缺失
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 构建会话 Cookie
pub fn session_cookie_header(name: &str, session_id: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!("{}={}; Path=/", name, session_id))
        .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Some(email) = present(form.email) else {
        return Ok(reject(StatusCode::BAD_REQUEST, "email missing"));
    };
    let Some(password) = present(form.password) else {
        return Ok(reject(StatusCode::BAD_REQUEST, "password missing"));
    };

    tracing::debug!(
        form = %redact_pii(&format!("email={};password={};", email, password)),
        "Login attempt"
    );

    let Some(user) = state.users.find_by_email(&email).await? else {
        return Ok(reject(StatusCode::NOT_FOUND, "no user found for this email"));
    };

    if !state.hasher.verify(&user.hashed_password, &password) {
        return Ok(reject(StatusCode::UNAUTHORIZED, "wrong password"));
    }

    let strategy = state
        .strategy
        .as_ref()
        .ok_or_else(|| AppError::Internal("No auth strategy configured".to_string()))?;

    let session_id = strategy.create_session(user.id).await.ok_or_else(|| {
        AppError::Internal(format!("Strategy {} cannot create sessions", strategy.kind()))
    })?;

    let cookie = session_cookie_header(&strategy.settings().session_name, &session_id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let mut response = Json(UserResponse::from(user)).into_response();
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(response)
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let destroyed = match state.strategy.as_ref() {
        Some(strategy) => strategy.destroy_session(&headers).await,
        None => false,
    };

    if !destroyed {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({})))
}
