//! 规则操作符定义

use std::fmt;

/// 条件比较符
///
/// 解析器不校验比较符 token，无法识别的比较符原样保留，
/// 求值时落入 [`Comparator::Unrecognized`] 分支并返回 `false`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Eq,
    Unrecognized(String),
}

impl Comparator {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            ">" => Self::Gt,
            "<" => Self::Lt,
            "=" => Self::Eq,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "=",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// 是否要求有序比较
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Lt)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 逻辑连接符
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
    /// 仅可能来自存储中的旧数据，求值结果恒为 `false`
    Unrecognized(String),
}

impl Connective {
    /// 识别关键字 token，非 `AND`/`OR` 返回 None
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    /// 从存储值还原，未知值保留为 Unrecognized
    pub fn from_stored(value: &str) -> Self {
        Self::from_keyword(value).unwrap_or_else(|| Self::Unrecognized(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
