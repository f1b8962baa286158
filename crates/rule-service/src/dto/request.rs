//! 请求 DTO 定义

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// 创建规则请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, max = 4096, message = "rule_string 长度必须在1-4096个字符之间"))]
    pub rule_string: String,

    #[validate(length(min = 1, max = 255, message = "规则名称长度必须在1-255个字符之间"))]
    pub name: Option<String>,
}

/// 规则求值请求
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRuleRequest {
    pub rule_id: i64,

    /// 待评估的数据记录，必须是 JSON 对象
    pub data: Value,

    /// 是否返回逐节点的求值轨迹
    #[serde(default)]
    pub trace: bool,
}

/// 规则合并请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombineRulesRequest {
    #[serde(default)]
    pub rule_ids: Vec<i64>,
}

/// 分页参数
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// 计算数据库查询的 offset
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.limit())
    }

    /// 获取限制条数（最大100）
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }
}
