//! 规则分词器
//!
//! 单次从左到右扫描，使用累加器收集自由文本（字段名、数字、带引号的字面量）。
//!
//! 关键字 `AND`/`OR` 按子串匹配，不检查单词边界：以 `OR` 开头的标识符
//! （如 `ORDER`）会被拆成 `OR` 和剩余部分。已持久化的规则依赖这一扫描语义，
//! 修改为单词边界匹配属于行为变更。

use crate::models::Token;

/// 关键字，按匹配优先级排列
const KEYWORDS: [&str; 2] = ["AND", "OR"];

/// 单字符分组/比较符号
const SYMBOLS: [char; 5] = ['(', ')', '>', '<', '='];

/// 将规则字符串切分为 token 序列
///
/// 分词器是宽松的，任何输入都能产生结果，不做类型转换。
pub fn tokenize(rule: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = rule.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if ch.is_whitespace() {
            flush(&mut current, &mut tokens);
            continue;
        }

        if let Some(keyword) = KEYWORDS.iter().find(|k| rule[i..].starts_with(*k)) {
            flush(&mut current, &mut tokens);
            tokens.push(Token::new(*keyword));
            // 关键字均为 ASCII，跳过剩余字符
            for _ in 1..keyword.len() {
                chars.next();
            }
            continue;
        }

        if SYMBOLS.contains(&ch) {
            flush(&mut current, &mut tokens);
            tokens.push(Token::new(ch.to_string()));
            continue;
        }

        current.push(ch);
    }

    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        tokens.push(Token::new(std::mem::take(current)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_condition() {
        assert_eq!(tokenize("age > 30"), vec!["age", ">", "30"]);
    }

    #[test]
    fn test_symbols_without_whitespace() {
        assert_eq!(tokenize("(age>30)"), vec!["(", "age", ">", "30", ")"]);
        assert_eq!(tokenize("name='Bob'"), vec!["name", "=", "'Bob'"]);
    }

    #[test]
    fn test_grouped_rule() {
        assert_eq!(
            tokenize("(age > 30 AND department = 'Sales')"),
            vec!["(", "age", ">", "30", "AND", "department", "=", "'Sales'", ")"]
        );
    }

    #[test]
    fn test_keyword_between_operands() {
        assert_eq!(tokenize("score OR 5"), vec!["score", "OR", "5"]);
    }

    #[test]
    fn test_keyword_matched_inside_identifier() {
        // 关键字按子串匹配，不检查单词边界
        assert_eq!(tokenize("ORDER > 5"), vec!["OR", "DER", ">", "5"]);
        assert_eq!(tokenize("SCORE > 5"), vec!["SC", "OR", "E", ">", "5"]);
        assert_eq!(tokenize("BRAND = 'x'"), vec!["BR", "AND", "=", "'x'"]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(tokenize("a > 1 and b > 2"), vec!["a", ">", "1", "and", "b", ">", "2"]);
    }

    #[test]
    fn test_whitespace_variants() {
        assert_eq!(tokenize("  age\t>\n30  "), vec!["age", ">", "30"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_non_ascii_text_accumulates() {
        assert_eq!(tokenize("城市 = '上海'"), vec!["城市", "=", "'上海'"]);
    }

    #[test]
    fn test_decimal_literal_kept_raw() {
        assert_eq!(tokenize("score > 4.5"), vec!["score", ">", "4.5"]);
    }
}
