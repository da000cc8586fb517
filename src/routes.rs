//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::Method,
    routing::{any, delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any);

    // 受认证策略保护的 API
    let api_routes = Router::new()
        .route("/api/v1/status", get(handlers::status::status))
        .route("/api/v1/unauthorized", get(handlers::status::unauthorized))
        .route("/api/v1/forbidden", get(handlers::status::forbidden))
        .route("/api/v1/users/me", get(handlers::status::me))
        .route(
            "/api/v1/auth_session/login",
            post(handlers::session_auth::login),
        )
        .route(
            "/api/v1/auth_session/logout",
            delete(handlers::session_auth::logout),
        )
        .route("/api/v1/{*rest}", any(handlers::status::not_found))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::auth_gate_middleware,
        ))
        .layer(cors);

    // 账户服务（使用用户记录中的会话）
    let account_routes = Router::new()
        .route("/", get(handlers::account::welcome))
        .route("/register", post(handlers::account::register))
        .route(
            "/sessions",
            post(handlers::account::login).delete(handlers::account::logout),
        )
        .route("/profile", get(handlers::account::profile))
        .route(
            "/reset_password",
            post(handlers::account::get_reset_password_token)
                .put(handlers::account::update_password),
        );

    Router::new()
        .merge(api_routes)
        .merge(account_routes)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
