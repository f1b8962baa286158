//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewRule, StoredRule};

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 保存规则并返回带 id 和创建时间的完整记录
    async fn insert(&self, rule: NewRule) -> Result<StoredRule>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredRule>>;

    /// 批量查询，结果顺序不保证，不存在的 id 直接忽略
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<StoredRule>>;

    /// 按 id 倒序分页
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<StoredRule>>;

    async fn count(&self) -> Result<i64>;

    /// 存储可用性检查（就绪探针）
    async fn health_check(&self) -> Result<()>;
}
