//! HTTP 中间件
//! 应用状态与请求追踪

use crate::{
    auth::{build_strategy, AuthStrategy, PasswordHasher, StrategyDeps},
    config::AppConfig,
    db::Repositories,
    error::AppError,
    repository::UserRepository,
    services::AuthService,
};
use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 会话映射由认证策略持有，进程内只构建一次。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserRepository>,
    /// `None` 表示未启用认证门禁
    pub strategy: Option<Arc<dyn AuthStrategy>>,
    pub auth_service: Arc<AuthService>,
    pub hasher: Arc<PasswordHasher>,
}

impl AppState {
    pub fn new(config: AppConfig, repositories: Repositories) -> Result<Self, AppError> {
        let hasher = Arc::new(PasswordHasher::from_config(&config.security)?);

        let strategy = build_strategy(
            &config.auth,
            StrategyDeps {
                users: repositories.users.clone(),
                sessions: repositories.sessions.clone(),
                hasher: hasher.clone(),
            },
        )?;

        Ok(Self {
            auth_service: Arc::new(AuthService::new(repositories.users.clone(), hasher.clone())),
            hasher,
            users: repositories.users,
            strategy,
            config,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 request_id，并记录日志与指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!("http_requests_total", "status" => status.to_string()).increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}
