//! 规则语言前端
//!
//! 将文本规则（如 `(age > 30 AND salary > 50000) OR department = 'Sales'`）
//! 转换为可复用的表达式树，支持：
//! - 分词和递归下降解析
//! - 表达式树的存储格式序列化
//! - 针对数据记录求值（不短路）
//! - 多条规则合并为 AND 树
//!
//! 所有操作都是纯函数，不持有全局状态，可在多线程中直接并发调用。

pub mod codec;
pub mod combiner;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod models;
pub mod operators;
pub mod parser;

pub use codec::StoredNode;
pub use combiner::combine;
pub use error::{ParseError, ParseErrorKind, Result, RuleError};
pub use evaluator::{ConditionEvaluator, evaluate};
pub use executor::RuleExecutor;
pub use lexer::tokenize;
pub use models::{
    Condition, EvaluationResult, ExprNode, OperatorNode, Record, Token, UnrecognizedNode,
};
pub use operators::{Comparator, Connective};
pub use parser::{MAX_NESTING_DEPTH, compile, parse_expression, parse_rule};
