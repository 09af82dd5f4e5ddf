//! Operator sugar: `a & b`, `a | b` and `!a` build `And`, `Or` and `Not` nodes.
use super::{LogicalNode, and, not, or};

impl std::ops::BitAnd for LogicalNode {
    type Output = LogicalNode;

    fn bitand(self, rhs: LogicalNode) -> Self::Output {
        and(self, rhs)
    }
}

impl std::ops::BitOr for LogicalNode {
    type Output = LogicalNode;

    fn bitor(self, rhs: LogicalNode) -> Self::Output {
        or(self, rhs)
    }
}

impl std::ops::Not for LogicalNode {
    type Output = LogicalNode;

    fn not(self) -> Self::Output {
        not(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{LogicalNode, eq, gt};

    #[test]
    fn sugar_builds_the_expected_shape() {
        let tree = eq("a", 1) & (gt("b", 2) | !eq("c", "x"));
        match tree {
            LogicalNode::And(left, right) => {
                assert!(left.is_comparison());
                match *right {
                    LogicalNode::Or(_, negated) => assert!(negated.is_not()),
                    other => panic!("expected Or, got {other:?}"),
                }
            }
            other => panic!("expected And, got {other:?}"),
        }
    }
}
