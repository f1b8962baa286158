//! 应用状态定义

use std::sync::Arc;

use crate::repository::RuleRepository;
use crate::service::RuleService;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub rules: RuleService,
    /// 就绪探针中展示的存储后端名称
    pub storage_backend: &'static str,
}

impl AppState {
    pub fn new(repo: Arc<dyn RuleRepository>, storage_backend: &'static str) -> Self {
        Self {
            rules: RuleService::new(repo),
            storage_backend,
        }
    }
}
