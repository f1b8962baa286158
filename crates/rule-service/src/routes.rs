//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};
use rule_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 规则相关的路由
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(handlers::rule::list_rules).post(handlers::rule::create_rule),
        )
        .route("/rules/evaluate", post(handlers::rule::evaluate_rule))
        .route("/rules/combine", post(handlers::rule::combine_rules))
        .route("/rules/{id}", get(handlers::rule::get_rule))
}

/// 构建完整应用路由（含探针与可观测性中间件）
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", rule_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
