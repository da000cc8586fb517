//! 会话认证服务主入口

use session_auth::{config::AppConfig, db, middleware::AppState, routes, telemetry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("session-auth {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "session-auth starting...");

    // 3. 存储后端
    let repositories = db::init_repositories(&config).await?;

    tracing::info!(storage = %config.auth.storage, "Storage initialized");

    // 4. 构建应用状态（认证策略在此选定）
    let app_state = Arc::new(AppState::new(config.clone(), repositories)?);

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制退出
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("session-auth {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: session-auth [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  AUTH_TYPE           认证策略 (none, auth, basic_auth, session_auth,");
    println!("                      session_exp_auth, session_db_auth)");
    println!("  SESSION_NAME        会话 Cookie 名 (默认 _my_session_id)");
    println!("  SESSION_DURATION    会话有效期秒数，0 表示不过期");
    println!("  AUTH_AUTH__STORAGE  memory 或 postgres");
    println!("  AUTH_DATABASE__URL  PostgreSQL 连接串");
}
