//! Lossless mapping between [`LogicalNode`] and [`EncodedNode`].
//!
//! Both directions are total: every logical leaf has exactly one wire variant,
//! selected by its operator and the kind of its value, and every wire variant
//! maps back to exactly one logical leaf. `decode(encode(t)) == t` for every tree.
use crate::{
    encoding::{EncodedLeaf, EncodedNode},
    node::{Comparison, ComparisonOp, LogicalNode},
    value::AttributeValue,
};

impl LogicalNode {
    /// Projects the tree onto its wire form.
    pub fn encode(&self) -> EncodedNode {
        match self {
            LogicalNode::And(left, right) => {
                EncodedNode::And(Box::new(left.encode()), Box::new(right.encode()))
            }
            LogicalNode::Or(left, right) => {
                EncodedNode::Or(Box::new(left.encode()), Box::new(right.encode()))
            }
            LogicalNode::Not(child) => EncodedNode::Not(Box::new(child.encode())),
            LogicalNode::Comparison(comparison) => comparison.encode(),
        }
    }
}

impl Comparison {
    #[inline(never)]
    pub fn encode(&self) -> EncodedNode {
        let key = self.key.clone();
        match (self.op, &self.value) {
            (ComparisonOp::Eq, AttributeValue::Integer(v)) => {
                EncodedNode::EqInt(EncodedLeaf::new(key, *v))
            }
            (ComparisonOp::Eq, AttributeValue::Text(s)) => {
                EncodedNode::EqText(EncodedLeaf::new(key, s.clone()))
            }
            (ComparisonOp::NotEq, AttributeValue::Integer(v)) => {
                EncodedNode::NotEqInt(EncodedLeaf::new(key, *v))
            }
            (ComparisonOp::NotEq, AttributeValue::Text(s)) => {
                EncodedNode::NotEqText(EncodedLeaf::new(key, s.clone()))
            }
            (ComparisonOp::Lt, AttributeValue::Integer(v)) => {
                EncodedNode::LtInt(EncodedLeaf::new(key, *v))
            }
            (ComparisonOp::Lt, AttributeValue::Text(s)) => {
                EncodedNode::LtText(EncodedLeaf::new(key, s.clone()))
            }
            (ComparisonOp::Gt, AttributeValue::Integer(v)) => {
                EncodedNode::GtInt(EncodedLeaf::new(key, *v))
            }
            (ComparisonOp::Gt, AttributeValue::Text(s)) => {
                EncodedNode::GtText(EncodedLeaf::new(key, s.clone()))
            }
        }
    }
}

fn leaf<T: Into<AttributeValue>>(op: ComparisonOp, encoded: EncodedLeaf<T>) -> LogicalNode {
    LogicalNode::Comparison(Comparison::new(op, encoded.key, encoded.value))
}

impl EncodedNode {
    /// Rebuilds the logical tree. Consumes the wire form, which is transient.
    pub fn decode(self) -> LogicalNode {
        match self {
            EncodedNode::And(left, right) => {
                LogicalNode::And(Box::new(left.decode()), Box::new(right.decode()))
            }
            EncodedNode::Or(left, right) => {
                LogicalNode::Or(Box::new(left.decode()), Box::new(right.decode()))
            }
            EncodedNode::Not(child) => LogicalNode::Not(Box::new(child.decode())),
            leaf_node => leaf_node.decode_leaf(),
        }
    }

    // Kept out of `decode` so that its recursive frame stays small.
    #[inline(never)]
    fn decode_leaf(self) -> LogicalNode {
        match self {
            EncodedNode::EqInt(l) => leaf(ComparisonOp::Eq, l),
            EncodedNode::EqText(l) => leaf(ComparisonOp::Eq, l),
            EncodedNode::NotEqInt(l) => leaf(ComparisonOp::NotEq, l),
            EncodedNode::NotEqText(l) => leaf(ComparisonOp::NotEq, l),
            EncodedNode::LtInt(l) => leaf(ComparisonOp::Lt, l),
            EncodedNode::LtText(l) => leaf(ComparisonOp::Lt, l),
            EncodedNode::GtInt(l) => leaf(ComparisonOp::Gt, l),
            EncodedNode::GtText(l) => leaf(ComparisonOp::Gt, l),
            EncodedNode::And(..) | EncodedNode::Or(..) | EncodedNode::Not(_) => self.decode(),
        }
    }
}

impl From<&LogicalNode> for EncodedNode {
    fn from(value: &LogicalNode) -> Self {
        value.encode()
    }
}

impl From<EncodedNode> for LogicalNode {
    fn from(value: EncodedNode) -> Self {
        value.decode()
    }
}
