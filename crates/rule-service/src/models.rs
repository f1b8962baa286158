//! 规则持久化模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 未提供名称时使用的默认规则名
pub const DEFAULT_RULE_NAME: &str = "Unnamed Rule";

/// 已保存的规则
///
/// `ast_json` 是表达式树的存储格式（type/value/left/right），按原样保存为文本。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredRule {
    pub id: i64,
    pub name: String,
    pub rule_string: String,
    pub ast_json: String,
    pub created_at: DateTime<Utc>,
}

/// 待写入的规则
#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub name: String,
    pub rule_string: String,
    pub ast_json: String,
}
