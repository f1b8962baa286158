//! PostgreSQL 规则仓储

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::instrument;

use super::traits::RuleRepository;
use crate::error::Result;
use crate::models::{NewRule, StoredRule};

/// 内嵌的数据库迁移
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// 规则仓储
pub struct PgRuleRepository {
    pool: PgPool,
}

impl PgRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleRepository for PgRuleRepository {
    #[instrument(skip(self, rule), fields(name = %rule.name))]
    async fn insert(&self, rule: NewRule) -> Result<StoredRule> {
        let stored = sqlx::query_as::<_, StoredRule>(
            r#"
            INSERT INTO rules (name, rule_string, ast_json)
            VALUES ($1, $2, $3)
            RETURNING id, name, rule_string, ast_json, created_at
            "#,
        )
        .bind(&rule.name)
        .bind(&rule.rule_string)
        .bind(&rule.ast_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredRule>> {
        let rule = sqlx::query_as::<_, StoredRule>(
            r#"
            SELECT id, name, rule_string, ast_json, created_at
            FROM rules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rule)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<StoredRule>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rules = sqlx::query_as::<_, StoredRule>(
            r#"
            SELECT id, name, rule_string, ast_json, created_at
            FROM rules
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<StoredRule>> {
        let rules = sqlx::query_as::<_, StoredRule>(
            r#"
            SELECT id, name, rule_string, ast_json, created_at
            FROM rules
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn count(&self) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rules")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
