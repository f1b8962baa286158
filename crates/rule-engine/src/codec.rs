//! 表达式树存储格式
//!
//! 存储结构固定为 `{"type", "value", "left", "right"}`，叶子节点的
//! `left`/`right` 写为 `null`，读取时 `null` 与缺失等价。
//! 解码时拒绝结构不完整的树，不做任何修补。

use crate::error::{Result, RuleError};
use crate::models::{Condition, ExprNode, OperatorNode, UnrecognizedNode};
use crate::operators::Connective;
use serde::{Deserialize, Serialize};

const OPERAND: &str = "operand";
const OPERATOR: &str = "operator";

/// 存储层节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub left: Option<Box<StoredNode>>,
    #[serde(default)]
    pub right: Option<Box<StoredNode>>,
}

impl From<ExprNode> for StoredNode {
    fn from(node: ExprNode) -> Self {
        match node {
            ExprNode::Operand(cond) => Self {
                kind: OPERAND.to_string(),
                value: Some(cond.to_string()),
                left: None,
                right: None,
            },
            ExprNode::Operator(OperatorNode {
                connective,
                left,
                right,
            }) => Self {
                kind: OPERATOR.to_string(),
                value: Some(connective.as_str().to_string()),
                left: Some(Box::new((*left).into())),
                right: Some(Box::new((*right).into())),
            },
            ExprNode::Unrecognized(UnrecognizedNode {
                kind,
                value,
                left,
                right,
            }) => Self {
                kind,
                value,
                left: left.map(|n| Box::new((*n).into())),
                right: right.map(|n| Box::new((*n).into())),
            },
        }
    }
}

impl TryFrom<StoredNode> for ExprNode {
    type Error = RuleError;

    fn try_from(stored: StoredNode) -> Result<Self> {
        decode(stored, "root")
    }
}

fn decode(stored: StoredNode, path: &str) -> Result<ExprNode> {
    let StoredNode {
        kind,
        value,
        left,
        right,
    } = stored;

    match kind.as_str() {
        OPERAND => {
            if left.is_some() || right.is_some() {
                return Err(RuleError::MalformedTree(format!(
                    "叶子节点 '{}' 不能包含子节点",
                    path
                )));
            }
            let text = value.ok_or_else(|| {
                RuleError::MalformedTree(format!("叶子节点 '{}' 缺少条件", path))
            })?;
            Ok(ExprNode::Operand(Condition::parse(&text)?))
        }
        OPERATOR => {
            let connective = value.ok_or_else(|| {
                RuleError::MalformedTree(format!("运算节点 '{}' 缺少逻辑运算符", path))
            })?;
            let (Some(left), Some(right)) = (left, right) else {
                return Err(RuleError::MalformedTree(format!(
                    "运算节点 '{}' 必须恰好包含两个子节点",
                    path
                )));
            };
            Ok(ExprNode::operator(
                Connective::from_stored(&connective),
                decode(*left, &format!("{}.left", path))?,
                decode(*right, &format!("{}.right", path))?,
            ))
        }
        _ => {
            tracing::debug!(path, kind = %kind, "保留未知节点类型");
            let left = left
                .map(|n| decode(*n, &format!("{}.left", path)).map(Box::new))
                .transpose()?;
            let right = right
                .map(|n| decode(*n, &format!("{}.right", path)).map(Box::new))
                .transpose()?;
            Ok(ExprNode::Unrecognized(UnrecognizedNode {
                kind,
                value,
                left,
                right,
            }))
        }
    }
}

/// 序列化为存储用 JSON 文本
pub fn to_json(node: &ExprNode) -> Result<String> {
    Ok(serde_json::to_string(node)?)
}

/// 序列化为 JSON 值
pub fn to_value(node: &ExprNode) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(node)?)
}

/// 从存储 JSON 文本还原表达式树
pub fn from_json(json: &str) -> Result<ExprNode> {
    let stored: StoredNode = serde_json::from_str(json)?;
    ExprNode::try_from(stored)
}

/// 从 JSON 值还原表达式树
pub fn from_value(value: serde_json::Value) -> Result<ExprNode> {
    let stored: StoredNode = serde_json::from_value(value)?;
    ExprNode::try_from(stored)
}
