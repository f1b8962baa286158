//! 规则 API 处理器
//!
//! 创建、查询、求值与合并规则。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    dto::{
        ApiResponse, CombineDto, CombineRulesRequest, CreateRuleRequest, EvaluateRuleRequest,
        EvaluationDto, PageResponse, PaginationParams, RuleDto,
    },
    error::ServiceError,
    state::AppState,
};

/// 创建规则
///
/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RuleDto>>), ServiceError> {
    let rule = state.rules.create_rule(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(rule, "Rule created successfully")),
    ))
}

/// 规则列表
///
/// GET /api/rules
pub async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<RuleDto>>>, ServiceError> {
    let page = state.rules.list_rules(&params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// 规则详情
///
/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RuleDto>>, ServiceError> {
    let rule = state.rules.get_rule(id).await?;
    Ok(Json(ApiResponse::success(rule)))
}

/// 规则求值
///
/// POST /api/rules/evaluate
pub async fn evaluate_rule(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRuleRequest>,
) -> Result<Json<ApiResponse<EvaluationDto>>, ServiceError> {
    let result = state.rules.evaluate(req).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// 规则合并
///
/// POST /api/rules/combine
pub async fn combine_rules(
    State(state): State<AppState>,
    Json(req): Json<CombineRulesRequest>,
) -> Result<Json<ApiResponse<CombineDto>>, ServiceError> {
    let combined = state.rules.combine(req).await?;
    Ok(Json(ApiResponse::success(combined)))
}
