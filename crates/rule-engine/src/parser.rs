//! 递归下降解析器
//!
//! 语法（单层二元组合）：
//!
//! ```text
//! expr    := '(' expr (('AND'|'OR') expr)? ')'
//!          | operand
//! operand := FIELD COMPARATOR VALUE
//! ```
//!
//! 每个分组最多识别一个逻辑运算符，`(a AND b AND c)` 这类链式写法
//! 直接报错，需要用括号显式分组。顶层视为不带括号的隐式分组。
//!
//! 括号嵌套不超过 [`MAX_NESTING_DEPTH`] 层，保证解析、求值和存储解码的递归深度有界。

use crate::error::{ParseError, ParseErrorKind, Result};
use crate::lexer::tokenize;
use crate::models::{Condition, ExprNode, Token};
use crate::operators::Connective;
use tracing::debug;

const OPEN: &str = "(";
const CLOSE: &str = ")";

/// 允许的最大括号嵌套层数
///
/// 表达式树深度至多为嵌套层数加二，远低于 serde_json 解码的 128 层递归上限。
pub const MAX_NESTING_DEPTH: usize = 32;

/// 从 `pos` 开始解析一个表达式，返回节点和下一个未消费的位置
pub fn parse_expression(tokens: &[Token], pos: usize) -> Result<(ExprNode, usize)> {
    parse_expression_at(tokens, pos, 0)
}

fn parse_expression_at(tokens: &[Token], pos: usize, depth: usize) -> Result<(ExprNode, usize)> {
    let token = tokens.get(pos).ok_or_else(|| ParseError::unexpected_end(pos))?;

    match token.as_str() {
        OPEN if depth >= MAX_NESTING_DEPTH => Err(ParseError::new(
            pos,
            ParseErrorKind::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            },
        )
        .into()),
        OPEN => parse_group(tokens, pos + 1, depth + 1),
        CLOSE => Err(ParseError::new(
            pos,
            ParseErrorKind::UnexpectedToken {
                found: CLOSE.to_string(),
                expected: "表达式".to_string(),
            },
        )
        .into()),
        _ => parse_operand(tokens, pos),
    }
}

/// 解析完整规则：允许顶层一个逻辑运算符，不允许剩余 token
pub fn parse_rule(tokens: &[Token]) -> Result<ExprNode> {
    if tokens.is_empty() {
        return Err(ParseError::new(0, ParseErrorKind::EmptyRule).into());
    }

    let (node, next) = parse_binary(tokens, 0, 0)?;

    if let Some(token) = tokens.get(next) {
        return Err(ParseError::new(
            next,
            ParseErrorKind::TrailingTokens {
                found: token.to_string(),
            },
        )
        .into());
    }

    Ok(node)
}

/// 分词并解析规则字符串
pub fn compile(rule: &str) -> Result<ExprNode> {
    let tokens = tokenize(rule);
    debug!(token_count = tokens.len(), "规则分词完成");
    parse_rule(&tokens)
}

/// 分组：左括号已消费，解析内部并消费右括号
fn parse_group(tokens: &[Token], pos: usize, depth: usize) -> Result<(ExprNode, usize)> {
    let (node, pos) = parse_binary(tokens, pos, depth)?;

    match tokens.get(pos) {
        Some(token) if token.as_str() == CLOSE => Ok((node, pos + 1)),
        Some(token) => Err(ParseError::new(
            pos,
            ParseErrorKind::UnexpectedToken {
                found: token.to_string(),
                expected: format!("'{}'", CLOSE),
            },
        )
        .into()),
        None => Err(ParseError::unexpected_end(pos).into()),
    }
}

/// `expr (('AND'|'OR') expr)?`
fn parse_binary(tokens: &[Token], pos: usize, depth: usize) -> Result<(ExprNode, usize)> {
    let (left, pos) = parse_expression_at(tokens, pos, depth)?;

    let Some(connective) = tokens
        .get(pos)
        .and_then(|t| Connective::from_keyword(t.as_str()))
    else {
        return Ok((left, pos));
    };

    let (right, next) = parse_expression_at(tokens, pos + 1, depth)?;

    if let Some(token) = tokens.get(next) {
        if Connective::from_keyword(token.as_str()).is_some() {
            return Err(ParseError::new(
                next,
                ParseErrorKind::UnsupportedChain {
                    connective: token.to_string(),
                },
            )
            .into());
        }
    }

    Ok((ExprNode::operator(connective, left, right), next))
}

/// 叶子条件：连续三个 token，不校验比较符
fn parse_operand(tokens: &[Token], pos: usize) -> Result<(ExprNode, usize)> {
    match tokens.get(pos..pos + 3) {
        Some([field, comparator, value]) => Ok((
            ExprNode::operand(Condition::new(
                field.as_str(),
                comparator.as_str(),
                value.as_str(),
            )),
            pos + 3,
        )),
        _ => Err(ParseError::unexpected_end(tokens.len()).into()),
    }
}
