//! 规则引擎领域模型

use crate::codec::StoredNode;
use crate::error::{Result, RuleError};
use crate::operators::{Comparator, Connective};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// 词法单元
///
/// 只保留原始文本，分类在解析阶段完成。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// 叶子条件：`<字段> <比较符> <值>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub field: String,
    pub comparator: Comparator,
    /// 原始字面量，字符串值保留两侧单引号
    pub literal: String,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        comparator: impl AsRef<str>,
        literal: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            comparator: Comparator::from_symbol(comparator.as_ref()),
            literal: literal.into(),
        }
    }

    /// 从条件字符串还原，必须恰好包含三个以空白分隔的部分
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [field, comparator, literal] => Ok(Self::new(*field, *comparator, *literal)),
            _ => Err(RuleError::MalformedCondition(text.to_string())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// 逻辑运算节点，恰好两个子节点
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorNode {
    pub connective: Connective,
    pub left: Box<ExprNode>,
    pub right: Box<ExprNode>,
}

/// 存储中出现的未知节点类型
///
/// 解析器不会产生此节点。保留原始内容以便原样写回，求值结果恒为 `false`。
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedNode {
    pub kind: String,
    pub value: Option<String>,
    pub left: Option<Box<ExprNode>>,
    pub right: Option<Box<ExprNode>>,
}

/// 表达式树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredNode", into = "StoredNode")]
pub enum ExprNode {
    Operand(Condition),
    Operator(OperatorNode),
    Unrecognized(UnrecognizedNode),
}

impl ExprNode {
    pub fn operand(condition: Condition) -> Self {
        Self::Operand(condition)
    }

    pub fn operator(connective: Connective, left: ExprNode, right: ExprNode) -> Self {
        Self::Operator(OperatorNode {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn and(left: ExprNode, right: ExprNode) -> Self {
        Self::operator(Connective::And, left, right)
    }

    pub fn or(left: ExprNode, right: ExprNode) -> Self {
        Self::operator(Connective::Or, left, right)
    }

    /// 节点类型名称，与存储格式中的 `type` 字段一致
    pub fn kind(&self) -> &str {
        match self {
            Self::Operand(_) => "operand",
            Self::Operator(_) => "operator",
            Self::Unrecognized(node) => &node.kind,
        }
    }

    /// 叶子条件数量
    pub fn operand_count(&self) -> usize {
        match self {
            Self::Operand(_) => 1,
            Self::Operator(node) => node.left.operand_count() + node.right.operand_count(),
            Self::Unrecognized(node) => {
                node.left.as_ref().map_or(0, |n| n.operand_count())
                    + node.right.as_ref().map_or(0, |n| n.operand_count())
            }
        }
    }

    /// 规则中引用的全部字段
    pub fn fields(&self) -> BTreeSet<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Self::Operand(cond) => {
                fields.insert(cond.field.clone());
            }
            Self::Operator(node) => {
                node.left.collect_fields(fields);
                node.right.collect_fields(fields);
            }
            Self::Unrecognized(node) => {
                for child in [&node.left, &node.right].into_iter().flatten() {
                    child.collect_fields(fields);
                }
            }
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(cond) => write!(f, "{}", cond),
            Self::Operator(node) => {
                write!(f, "({} {} {})", node.left, node.connective, node.right)
            }
            Self::Unrecognized(node) => write!(f, "<{}>", node.kind),
        }
    }
}

/// 评估记录：字段名到比较值的映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// 从 JSON 字符串创建，顶层必须是对象
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }

    /// 获取字段值，缺失时返回 None（不提供默认值）
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self::new(data)
    }
}

impl TryFrom<Value> for Record {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(RuleError::TypeMismatch {
                field: "<record>".to_string(),
                expected: "object".to_string(),
                actual: crate::evaluator::type_name(&other).to_string(),
            }),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 评估结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}
