//! 规则合并
//!
//! 将多棵表达式树从左到右折叠为一棵 AND 树：
//! `combine([a, b, c]) == AND(AND(a, b), c)`。

use crate::models::ExprNode;

/// 合并多条规则
///
/// 空输入返回 None，单条规则原样返回，不额外包装。
pub fn combine<I>(trees: I) -> Option<ExprNode>
where
    I: IntoIterator<Item = ExprNode>,
{
    trees
        .into_iter()
        .reduce(|combined, next| ExprNode::and(combined, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Condition;

    fn leaf(field: &str) -> ExprNode {
        ExprNode::operand(Condition::new(field, ">", "1"))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(combine(Vec::new()), None);
    }

    #[test]
    fn test_single_tree_unchanged() {
        assert_eq!(combine(vec![leaf("a")]), Some(leaf("a")));
    }

    #[test]
    fn test_left_associated() {
        let combined = combine(vec![leaf("a"), leaf("b"), leaf("c")]).unwrap();

        assert_eq!(
            combined,
            ExprNode::and(ExprNode::and(leaf("a"), leaf("b")), leaf("c"))
        );
        assert_ne!(
            combined,
            ExprNode::and(leaf("a"), ExprNode::and(leaf("b"), leaf("c")))
        );
    }

    #[test]
    fn test_inputs_kept_as_subtrees() {
        let or_tree = ExprNode::or(leaf("x"), leaf("y"));
        let combined = combine(vec![or_tree.clone(), leaf("z")]).unwrap();

        assert_eq!(combined, ExprNode::and(or_tree, leaf("z")));
    }
}
