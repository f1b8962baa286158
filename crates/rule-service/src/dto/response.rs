//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;
use crate::models::StoredRule;

/// 分页响应
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self::with_message(data, "操作成功")
    }

    /// 创建带自定义提示的成功响应
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 规则详情
#[derive(Debug, Clone, Serialize)]
pub struct RuleDto {
    pub id: i64,
    pub name: String,
    pub rule_string: String,
    /// 存储格式的表达式树
    pub ast: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StoredRule> for RuleDto {
    type Error = ServiceError;

    fn try_from(rule: StoredRule) -> Result<Self, Self::Error> {
        let ast = serde_json::from_str(&rule.ast_json)?;
        Ok(Self {
            id: rule.id,
            name: rule.name,
            rule_string: rule.rule_string,
            ast,
            created_at: rule.created_at,
        })
    }
}

/// 规则求值结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationDto {
    pub rule_id: i64,
    pub result: bool,
    /// 原样回显的输入数据
    pub data: Value,
    pub matched_conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// 规则合并结果
#[derive(Debug, Clone, Serialize)]
pub struct CombineDto {
    /// 参与合并的规则 id（按请求顺序）
    pub rule_ids: Vec<i64>,
    /// 请求中不存在的规则 id
    pub missing_ids: Vec<i64>,
    /// 没有任何规则参与时为 null
    pub combined_ast: Option<Value>,
}
