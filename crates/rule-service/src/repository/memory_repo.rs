//! 内存规则仓储
//!
//! 使用 DashMap 存储，进程重启后数据丢失，适用于本地开发和测试。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::traits::RuleRepository;
use crate::error::Result;
use crate::models::{NewRule, StoredRule};

/// 内存规则仓储
///
/// id 从 1 开始自增，与数据库 BIGSERIAL 行为一致。
#[derive(Debug)]
pub struct InMemoryRuleRepository {
    rules: DashMap<i64, StoredRule>,
    next_id: AtomicI64,
}

impl Default for InMemoryRuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn insert(&self, rule: NewRule) -> Result<StoredRule> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = StoredRule {
            id,
            name: rule.name,
            rule_string: rule.rule_string,
            ast_json: rule.ast_json,
            created_at: Utc::now(),
        };

        self.rules.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredRule>> {
        Ok(self.rules.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<StoredRule>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rules.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<StoredRule>> {
        let mut rules: Vec<StoredRule> = self
            .rules
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rules.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(rules
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rules.len() as i64)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_rule(rule_string: &str) -> NewRule {
        NewRule {
            name: "test".to_string(),
            rule_string: rule_string.to_string(),
            ast_json: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryRuleRepository::new();
        let a = repo.insert(new_rule("a > 1")).await.unwrap();
        let b = repo.insert(new_rule("b > 1")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = InMemoryRuleRepository::new();
        let stored = repo.insert(new_rule("a > 1")).await.unwrap();

        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
        assert_eq!(repo.find_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_missing() {
        let repo = InMemoryRuleRepository::new();
        repo.insert(new_rule("a > 1")).await.unwrap();
        repo.insert(new_rule("b > 1")).await.unwrap();

        let found = repo.find_by_ids(&[2, 5, 1]).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let repo = InMemoryRuleRepository::new();
        for i in 0..5 {
            repo.insert(new_rule(&format!("f{} > 1", i))).await.unwrap();
        }

        let page: Vec<i64> = repo
            .list(1, 2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(page, vec![4, 3]);

        assert!(repo.list(10, 2).await.unwrap().is_empty());
    }
}
