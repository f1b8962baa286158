//! 健康检查

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

const SERVICE_NAME: &str = "rule-service";

/// 存活探针：服务进程正常即返回 ok
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：检查规则存储是否可用
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let storage_ok = state.rules.health_check().await.is_ok();

    let status = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if storage_ok { "ok" } else { "degraded" },
            "service": SERVICE_NAME,
            "checks": {
                "storage": {
                    "backend": state.storage_backend,
                    "status": if storage_ok { "ok" } else { "fail" }
                }
            }
        })),
    )
}
