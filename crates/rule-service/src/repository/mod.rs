//! 规则仓储
//!
//! 服务层只依赖 [`RuleRepository`]，具体存储由配置决定。

mod memory_repo;
mod pg_repo;
mod traits;

pub use memory_repo::InMemoryRuleRepository;
pub use pg_repo::{MIGRATOR, PgRuleRepository};
pub use traits::RuleRepository;

#[cfg(test)]
pub use traits::MockRuleRepository;
