//! 规则引擎错误类型

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// 词法错误（预留）
    ///
    /// 当前分词器是宽松的，任何字符都能归类，因此不会产生该错误。
    #[error("词法错误: 位置 {position}: {message}")]
    Lex { position: usize, message: String },

    #[error("规则解析失败: {0}")]
    Parse(#[from] ParseError),

    #[error("字段不存在: {field} (比较符 {comparator} 需要可比较的值)")]
    FieldNotFound { field: String, comparator: String },

    #[error("类型不匹配: 字段 {field} 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("条件格式无效: '{0}' (需要 <字段> <比较符> <值> 三部分)")]
    MalformedCondition(String),

    #[error("表达式树结构无效: {0}")]
    MalformedTree(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 是否为求值阶段的类型错误（字段缺失或无法比较）
    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, Self::FieldNotFound { .. } | Self::TypeMismatch { .. })
    }

    /// 解析错误对应的 token 位置
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { position, .. } => Some(*position),
            Self::Parse(e) => Some(e.position),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// 解析错误，携带出错的 token 位置
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("位置 {position}: {kind}")]
pub struct ParseError {
    pub position: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    pub fn unexpected_end(position: usize) -> Self {
        Self::new(position, ParseErrorKind::UnexpectedEnd)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// token 序列在节点完成前耗尽
    UnexpectedEnd,
    /// 出现了当前位置不允许的 token
    UnexpectedToken { found: String, expected: String },
    /// 同一分组内出现第二个逻辑连接符，例如 `(a AND b AND c)`
    UnsupportedChain { connective: String },
    /// 完整表达式之后仍有剩余 token
    TrailingTokens { found: String },
    /// 规则为空
    EmptyRule,
    /// 括号嵌套超过上限
    NestingTooDeep { max: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "表达式意外结束"),
            Self::UnexpectedToken { found, expected } => {
                write!(f, "意外的 token '{}', 期望 {}", found, expected)
            }
            Self::UnsupportedChain { connective } => write!(
                f,
                "不支持在同一分组内连续使用逻辑运算符 '{}'，请使用括号分组",
                connective
            ),
            Self::TrailingTokens { found } => write!(f, "表达式结束后存在多余的 token '{}'", found),
            Self::EmptyRule => write!(f, "规则不能为空"),
            Self::NestingTooDeep { max } => write!(f, "括号嵌套超过 {} 层", max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_position() {
        let err: RuleError = ParseError::unexpected_end(4).into();
        assert_eq!(err.position(), Some(4));
        assert!(err.to_string().contains("位置 4"));
    }

    #[test]
    fn test_evaluation_error_grouping() {
        let absent = RuleError::FieldNotFound {
            field: "age".into(),
            comparator: ">".into(),
        };
        let mismatch = RuleError::TypeMismatch {
            field: "age".into(),
            expected: "integer".into(),
            actual: "string".into(),
        };

        assert!(absent.is_evaluation_error());
        assert!(mismatch.is_evaluation_error());
        assert!(!RuleError::MalformedCondition("age >".into()).is_evaluation_error());
        assert_eq!(absent.position(), None);
    }
}
