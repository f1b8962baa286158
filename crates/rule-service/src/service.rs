//! 规则服务
//!
//! 组合规则引擎与仓储，实现创建、查询、求值和合并。
//! 表达式树一律以存储格式落库，读取时重新解码。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use rule_engine::{ExprNode, Record, RuleExecutor, codec, combine, compile};
use rule_shared::observability::metrics;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{
    CombineDto, CombineRulesRequest, CreateRuleRequest, EvaluateRuleRequest, EvaluationDto,
    PageResponse, PaginationParams, RuleDto,
};
use crate::error::{Result, ServiceError};
use crate::models::{DEFAULT_RULE_NAME, NewRule, StoredRule};
use crate::repository::RuleRepository;

/// 规则服务
#[derive(Clone)]
pub struct RuleService {
    repo: Arc<dyn RuleRepository>,
}

impl RuleService {
    pub fn new(repo: Arc<dyn RuleRepository>) -> Self {
        Self { repo }
    }

    /// 解析规则文本并保存
    #[instrument(skip(self, req), fields(rule = %req.rule_string))]
    pub async fn create_rule(&self, req: CreateRuleRequest) -> Result<RuleDto> {
        req.validate()?;

        let root = match compile(&req.rule_string) {
            Ok(root) => root,
            Err(e) => {
                metrics::record_rule_created(false);
                warn!(error = %e, "规则解析失败");
                return Err(ServiceError::InvalidRule(e));
            }
        };

        let ast_json =
            codec::to_json(&root).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let stored = self
            .repo
            .insert(NewRule {
                name: req.name.unwrap_or_else(|| DEFAULT_RULE_NAME.to_string()),
                rule_string: req.rule_string,
                ast_json,
            })
            .await?;

        metrics::record_rule_created(true);
        info!(rule_id = stored.id, "规则已创建");

        RuleDto::try_from(stored)
    }

    pub async fn get_rule(&self, id: i64) -> Result<RuleDto> {
        let stored = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::RuleNotFound(id))?;

        RuleDto::try_from(stored)
    }

    pub async fn list_rules(&self, params: &PaginationParams) -> Result<PageResponse<RuleDto>> {
        let total = self.repo.count().await?;
        let rules = self.repo.list(params.offset(), params.limit()).await?;

        let items = rules
            .into_iter()
            .map(RuleDto::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(PageResponse::new(items, total, params.page, params.limit()))
    }

    /// 针对一条数据记录评估已保存的规则
    #[instrument(skip(self, req), fields(rule_id = req.rule_id, trace = req.trace))]
    pub async fn evaluate(&self, req: EvaluateRuleRequest) -> Result<EvaluationDto> {
        let stored = self
            .repo
            .find_by_id(req.rule_id)
            .await?
            .ok_or(ServiceError::RuleNotFound(req.rule_id))?;

        let root = decode_tree(&stored)?;

        let record = Record::try_from(req.data.clone())
            .map_err(|_| ServiceError::Validation("data 必须是 JSON 对象".to_string()))?;

        let executor = if req.trace {
            RuleExecutor::new().with_trace()
        } else {
            RuleExecutor::new()
        };

        let start = Instant::now();
        let result = executor
            .execute(&root, &record)
            .map_err(ServiceError::Evaluation)?;
        metrics::record_rule_evaluation(result.matched, start.elapsed().as_secs_f64());

        info!(matched = result.matched, "规则求值完成");

        Ok(EvaluationDto {
            rule_id: stored.id,
            result: result.matched,
            data: req.data,
            matched_conditions: result.matched_conditions,
            trace: req.trace.then_some(result.evaluation_trace),
        })
    }

    /// 将多条已保存的规则按请求顺序合并为一棵 AND 树
    ///
    /// 不存在的 id 跳过并记录到 missing_ids，合并结果不落库。
    #[instrument(skip(self, req), fields(count = req.rule_ids.len()))]
    pub async fn combine(&self, req: CombineRulesRequest) -> Result<CombineDto> {
        let found: HashMap<i64, StoredRule> = self
            .repo
            .find_by_ids(&req.rule_ids)
            .await?
            .into_iter()
            .map(|rule| (rule.id, rule))
            .collect();

        let mut used_ids = Vec::new();
        let mut missing_ids = Vec::new();
        let mut trees = Vec::new();

        for id in &req.rule_ids {
            match found.get(id) {
                Some(stored) => {
                    trees.push(decode_tree(stored)?);
                    used_ids.push(*id);
                }
                None => missing_ids.push(*id),
            }
        }

        if !missing_ids.is_empty() {
            warn!(?missing_ids, "部分规则不存在，已跳过");
        }

        metrics::record_rule_combination(trees.len());

        let combined_ast = combine(trees)
            .map(|root| codec::to_value(&root))
            .transpose()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        Ok(CombineDto {
            rule_ids: used_ids,
            missing_ids,
            combined_ast,
        })
    }

    /// 存储就绪检查
    pub async fn health_check(&self) -> Result<()> {
        self.repo.health_check().await
    }
}

fn decode_tree(stored: &StoredRule) -> Result<ExprNode> {
    codec::from_json(&stored.ast_json).map_err(|e| {
        ServiceError::Internal(format!("规则 {} 的表达式树无法解码: {}", stored.id, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryRuleRepository, MockRuleRepository};
    use chrono::Utc;
    use serde_json::json;

    fn service() -> RuleService {
        RuleService::new(Arc::new(InMemoryRuleRepository::new()))
    }

    fn create_req(rule: &str) -> CreateRuleRequest {
        CreateRuleRequest {
            rule_string: rule.to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_create_rule_defaults_name() {
        let svc = service();
        let dto = svc.create_rule(create_req("age > 30")).await.unwrap();

        assert_eq!(dto.name, DEFAULT_RULE_NAME);
        assert_eq!(dto.ast["type"], "operand");
        assert_eq!(dto.ast["value"], "age > 30");
    }

    #[tokio::test]
    async fn test_create_rule_rejects_invalid_syntax() {
        let svc = service();
        let err = svc.create_rule(create_req("(age > 30")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRule(_)));
    }

    #[tokio::test]
    async fn test_create_rule_rejects_empty_string() {
        let svc = service();
        let err = svc.create_rule(create_req("")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_with_trace() {
        let svc = service();
        let dto = svc
            .create_rule(create_req("(age > 30 AND department = 'Sales')"))
            .await
            .unwrap();

        let result = svc
            .evaluate(EvaluateRuleRequest {
                rule_id: dto.id,
                data: json!({"age": 35, "department": "Sales"}),
                trace: true,
            })
            .await
            .unwrap();

        assert!(result.result);
        assert_eq!(result.matched_conditions.len(), 2);
        assert_eq!(result.trace.map(|t| t.len()), Some(3));
    }

    #[tokio::test]
    async fn test_evaluate_missing_rule() {
        let svc = service();
        let err = svc
            .evaluate(EvaluateRuleRequest {
                rule_id: 404,
                data: json!({}),
                trace: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::RuleNotFound(404)));
    }

    #[tokio::test]
    async fn test_evaluate_non_object_data() {
        let svc = service();
        let dto = svc.create_rule(create_req("age > 30")).await.unwrap();

        let err = svc
            .evaluate(EvaluateRuleRequest {
                rule_id: dto.id,
                data: json!([1, 2, 3]),
                trace: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_missing_field_fails() {
        let svc = service();
        let dto = svc.create_rule(create_req("age > 30")).await.unwrap();

        let err = svc
            .evaluate(EvaluateRuleRequest {
                rule_id: dto.id,
                data: json!({"salary": 1}),
                trace: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Evaluation(_)));
    }

    #[tokio::test]
    async fn test_combine_preserves_request_order_and_reports_missing() {
        let svc = service();
        let a = svc.create_rule(create_req("age > 30")).await.unwrap();
        let b = svc
            .create_rule(create_req("department = 'Sales'"))
            .await
            .unwrap();

        let dto = svc
            .combine(CombineRulesRequest {
                rule_ids: vec![b.id, 99, a.id],
            })
            .await
            .unwrap();

        assert_eq!(dto.rule_ids, vec![b.id, a.id]);
        assert_eq!(dto.missing_ids, vec![99]);

        let ast = dto.combined_ast.unwrap();
        assert_eq!(ast["value"], "AND");
        assert_eq!(ast["left"]["value"], "department = 'Sales'");
        assert_eq!(ast["right"]["value"], "age > 30");
    }

    #[tokio::test]
    async fn test_combine_nothing_found() {
        let svc = service();
        let dto = svc
            .combine(CombineRulesRequest { rule_ids: vec![1, 2] })
            .await
            .unwrap();

        assert!(dto.rule_ids.is_empty());
        assert_eq!(dto.missing_ids, vec![1, 2]);
        assert!(dto.combined_ast.is_none());
    }

    #[tokio::test]
    async fn test_list_rules_paginates() {
        let svc = service();
        for i in 0..3 {
            svc.create_rule(create_req(&format!("f{} > 1", i)))
                .await
                .unwrap();
        }

        let page = svc
            .list_rules(&PaginationParams { page: 1, page_size: 2 })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_database_failure_propagates() {
        let mut repo = MockRuleRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Err(ServiceError::Database(sqlx::Error::PoolTimedOut)));

        let svc = RuleService::new(Arc::new(repo));
        let err = svc.get_rule(1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[tokio::test]
    async fn test_corrupt_stored_tree_is_internal_error() {
        let mut repo = MockRuleRepository::new();
        repo.expect_find_by_id().returning(|id| {
            Ok(Some(StoredRule {
                id,
                name: "broken".to_string(),
                rule_string: "age > 30".to_string(),
                ast_json: r#"{"type":"operator","value":"AND","left":null,"right":null}"#
                    .to_string(),
                created_at: Utc::now(),
            }))
        });

        let svc = RuleService::new(Arc::new(repo));
        let err = svc
            .evaluate(EvaluateRuleRequest {
                rule_id: 1,
                data: json!({"age": 40}),
                trace: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn test_insert_failure_propagates() {
        let mut repo = MockRuleRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(ServiceError::Database(sqlx::Error::PoolClosed)));

        let svc = RuleService::new(Arc::new(repo));
        let err = svc.create_rule(create_req("age > 30")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
