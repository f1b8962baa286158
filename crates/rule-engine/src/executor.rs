//! 规则执行器
//!
//! 在求值的同时记录命中条件和评估追踪，追踪中会出现每一个被访问的条件。

use crate::error::Result;
use crate::evaluator::{ConditionEvaluator, apply_connective};
use crate::models::{Condition, EvaluationResult, ExprNode, OperatorNode, Record};
use std::time::Instant;

/// 规则执行器
#[derive(Debug, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行规则评估
    pub fn execute(&self, root: &ExprNode, record: &Record) -> Result<EvaluationResult> {
        let start = Instant::now();
        let mut result = EvaluationResult::default();

        let matched = self.evaluate_node(root, record, &mut result, "root")?;
        result.matched = matched;
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        Ok(result)
    }

    fn evaluate_node(
        &self,
        node: &ExprNode,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        match node {
            ExprNode::Operand(cond) => self.evaluate_condition(cond, record, result, path),
            ExprNode::Operator(op) => self.evaluate_operator(op, record, result, path),
            ExprNode::Unrecognized(unknown) => {
                if self.trace_enabled {
                    result.evaluation_trace.push(format!(
                        "{}: 未知节点类型 '{}' => NOT_MATCHED",
                        path, unknown.kind
                    ));
                }
                Ok(false)
            }
        }
    }

    fn evaluate_condition(
        &self,
        cond: &Condition,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        let matched = ConditionEvaluator::evaluate(cond, record.get(&cond.field))?;

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} => {}",
                path,
                cond,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        if matched {
            result.matched_conditions.push(cond.to_string());
        }

        Ok(matched)
    }

    /// 两侧都求值后再合并
    fn evaluate_operator(
        &self,
        op: &OperatorNode,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        let left = self.evaluate_node(&op.left, record, result, &format!("{}.left", path))?;
        let right = self.evaluate_node(&op.right, record, result, &format!("{}.right", path))?;
        let matched = apply_connective(&op.connective, left, right);

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} (left={}, right={}) => {}",
                path,
                op.connective,
                left,
                right,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        Ok(matched)
    }
}
