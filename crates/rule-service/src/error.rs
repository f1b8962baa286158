//! 规则服务错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;
use rule_shared::error::SharedError;
use serde_json::json;

/// 规则服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("规则不存在: {0}")]
    RuleNotFound(i64),

    #[error("规则语法错误: {0}")]
    InvalidRule(#[source] RuleError),

    #[error("规则求值失败: {0}")]
    Evaluation(#[source] RuleError),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRule(_) | Self::Evaluation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::InvalidRule(_) => "INVALID_RULE",
            Self::Evaluation(_) => "EVALUATION_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}

impl From<SharedError> for ServiceError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::Database(e) => Self::Database(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::compile;

    fn parse_error() -> RuleError {
        compile("(age > 30").unwrap_err()
    }

    fn all_error_variants() -> Vec<(ServiceError, StatusCode, &'static str)> {
        vec![
            (ServiceError::Validation("rule_string 不能为空".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ServiceError::RuleNotFound(7), StatusCode::NOT_FOUND, "RULE_NOT_FOUND"),
            (ServiceError::InvalidRule(parse_error()), StatusCode::BAD_REQUEST, "INVALID_RULE"),
            (
                ServiceError::Evaluation(RuleError::FieldNotFound {
                    field: "age".into(),
                    comparator: ">".into(),
                }),
                StatusCode::BAD_REQUEST,
                "EVALUATION_FAILED",
            ),
            (ServiceError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            (ServiceError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_and_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            assert_eq!(error.status_code(), expected_status, "状态码不匹配: {expected_code}");
            assert_eq!(error.error_code(), expected_code);
        }
    }

    #[test]
    fn test_display_contains_context() {
        assert!(ServiceError::RuleNotFound(42).to_string().contains("42"));
        assert!(ServiceError::InvalidRule(parse_error()).to_string().contains("规则语法错误"));
    }

    #[test]
    fn test_from_shared_error() {
        let err: ServiceError = SharedError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ServiceError::Database(_)));

        let err: ServiceError = SharedError::Internal("x".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn test_into_response_body_structure() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);

            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

            assert_eq!(body["success"], false);
            assert_eq!(body["code"], expected_code);
            assert!(body["message"].is_string());
            assert!(body["data"].is_null());
        }
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let response = ServiceError::Internal("secret detail".into()).into_response();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

        assert!(!body["message"].as_str().unwrap().contains("secret detail"));
    }
}
