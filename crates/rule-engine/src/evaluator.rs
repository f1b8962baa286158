//! 表达式树求值
//!
//! 叶子条件的数值转换规则：
//! - 字面量全部为数字时，字面量与记录值都转换为整数比较；
//! - 字面量由数字和至多一个小数点组成时，两者都转换为浮点数比较；
//! - 否则按文本处理：`=` 比较去掉两侧单引号后的文本，`>`/`<` 只对字符串值做字典序比较。
//!
//! 逻辑节点总是先求值左右两个子树再合并结果，不做短路。
//! 无法识别的节点类型、连接符或比较符求值为 `false`，不报错。

use crate::error::{Result, RuleError};
use crate::models::{Condition, ExprNode, Record};
use crate::operators::{Comparator, Connective};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// 对记录求值表达式树
pub fn evaluate(node: &ExprNode, record: &Record) -> Result<bool> {
    match node {
        ExprNode::Operand(cond) => ConditionEvaluator::evaluate(cond, record.get(&cond.field)),
        ExprNode::Operator(op) => {
            let left = evaluate(&op.left, record)?;
            let right = evaluate(&op.right, record)?;
            Ok(apply_connective(&op.connective, left, right))
        }
        ExprNode::Unrecognized(node) => {
            debug!(kind = %node.kind, "未知节点类型，求值为 false");
            Ok(false)
        }
    }
}

/// 合并左右子树结果，调用方需已求值两侧
pub fn apply_connective(connective: &Connective, left: bool, right: bool) -> bool {
    match connective {
        Connective::And => left && right,
        Connective::Or => left || right,
        Connective::Unrecognized(raw) => {
            debug!(connective = %raw, "未知逻辑运算符，求值为 false");
            false
        }
    }
}

/// 字面量分类
#[derive(Debug, Clone, Copy, PartialEq)]
enum Literal<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

impl<'a> Literal<'a> {
    fn classify(raw: &'a str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return match raw.parse::<i64>() {
                Ok(n) => Self::Integer(n),
                // 超出 i64 范围时退化为浮点数
                Err(_) => raw.parse().map(Self::Float).unwrap_or(Self::Text(raw)),
            };
        }

        let digits = raw.bytes().filter(|b| b.is_ascii_digit()).count();
        let dots = raw.bytes().filter(|b| *b == b'.').count();
        if digits > 0 && dots == 1 && digits + dots == raw.len() {
            if let Ok(n) = raw.parse() {
                return Self::Float(n);
            }
        }

        Self::Text(raw)
    }
}

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单个条件
    ///
    /// # Arguments
    /// * `cond` - 叶子条件
    /// * `field_value` - 记录中的字段值，缺失为 None
    pub fn evaluate(cond: &Condition, field_value: Option<&Value>) -> Result<bool> {
        if let Comparator::Unrecognized(raw) = &cond.comparator {
            debug!(field = %cond.field, comparator = %raw, "未知比较符，求值为 false");
            return Ok(false);
        }

        match Literal::classify(&cond.literal) {
            Literal::Integer(expected) => match field_value.and_then(Self::as_integer) {
                Some(actual) => Ok(Self::apply(&cond.comparator, actual.cmp(&expected))),
                None => Self::not_coercible(cond, field_value, "integer"),
            },
            Literal::Float(expected) => match field_value.and_then(Self::as_float) {
                Some(actual) => Ok(actual
                    .partial_cmp(&expected)
                    .is_some_and(|ord| Self::apply(&cond.comparator, ord))),
                None => Self::not_coercible(cond, field_value, "float"),
            },
            Literal::Text(text) => Self::compare_text(cond, field_value, text),
        }
    }

    fn apply(comparator: &Comparator, ordering: Ordering) -> bool {
        match comparator {
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Unrecognized(_) => false,
        }
    }

    /// 数值字面量但记录值无法转换
    fn not_coercible(cond: &Condition, field_value: Option<&Value>, expected: &str) -> Result<bool> {
        match (field_value, &cond.comparator) {
            (_, Comparator::Eq) => Ok(false),
            (None, _) => Err(Self::field_not_found(cond)),
            (Some(value), _) => Err(RuleError::TypeMismatch {
                field: cond.field.clone(),
                expected: expected.to_string(),
                actual: type_name(value).to_string(),
            }),
        }
    }

    fn compare_text(cond: &Condition, field_value: Option<&Value>, literal: &str) -> Result<bool> {
        if cond.comparator == Comparator::Eq {
            let expected = literal.trim_matches('\'');
            return Ok(matches!(field_value, Some(Value::String(s)) if s == expected));
        }

        match field_value {
            Some(Value::String(s)) => Ok(Self::apply(&cond.comparator, s.as_str().cmp(literal))),
            Some(other) => Err(RuleError::TypeMismatch {
                field: cond.field.clone(),
                expected: "string".to_string(),
                actual: type_name(other).to_string(),
            }),
            None => Err(Self::field_not_found(cond)),
        }
    }

    fn field_not_found(cond: &Condition) -> RuleError {
        RuleError::FieldNotFound {
            field: cond.field.clone(),
            comparator: cond.comparator.to_string(),
        }
    }

    /// 转换为整数，浮点数向零截断
    fn as_integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    fn as_float(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// 获取值的类型名称
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
