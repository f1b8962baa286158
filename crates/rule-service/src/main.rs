//! 规则服务入口
//!
//! 加载配置、初始化可观测性与存储，然后启动 HTTP 服务。

use std::sync::Arc;

use axum::http::HeaderValue;
use rule_service::{
    AppState,
    repository::{InMemoryRuleRepository, MIGRATOR, PgRuleRepository, RuleRepository},
    routes,
};
use rule_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const SERVICE_NAME: &str = "rule-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 文件可选，不存在时忽略
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        storage = ?config.storage.backend,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let (repo, backend_name): (Arc<dyn RuleRepository>, &'static str) =
        match config.storage.backend {
            StorageBackend::Postgres => {
                let db = Database::connect(&config.database).await?;
                db.run_migrations(&MIGRATOR).await?;
                (Arc::new(PgRuleRepository::new(db.pool().clone())), "postgres")
            }
            StorageBackend::Memory => {
                if config.is_production() {
                    warn!("生产环境使用内存存储，重启后规则将丢失");
                }
                (Arc::new(InMemoryRuleRepository::new()), "memory")
            }
        };

    let state = AppState::new(repo, backend_name);
    let app = routes::app(state).layer(cors_layer());

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：通过 RULES_CORS_ORIGINS 环境变量控制允许的来源
fn cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("RULES_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    if allowed_origins == "*" {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
