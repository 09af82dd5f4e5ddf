//! Logical boolean expression trees.
//!
//! A [`LogicalNode`] is the in-memory form of a predicate: `&&`, `||` and `!`
//! over comparison leaves. Trees are immutable once built and can be shared
//! freely between threads for concurrent evaluation.
//!
//! ```
//! use betree::prelude::*;
//!
//! let tree = eq("val1", "1") & !gt("val2", 10);
//!
//! let mut attrs = AttributeMap::new();
//! attrs.insert("val1".into(), "1".into());
//! attrs.insert("val2".into(), 3.into());
//! assert_eq!(tree.eval(&attrs).unwrap(), true);
//! ```
use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumIter};

use crate::{
    utils::error::{BetResult, Error},
    value::{AttributeSource, AttributeValue},
};

mod ops;
pub mod pretty;

/// Comparison operators available to leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    NotEq,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">")]
    Gt,
}

impl ComparisonOp {
    /// Whether `attribute <op> operand` holds, given `attribute.cmp(operand)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::NotEq => ordering != Ordering::Equal,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Gt => ordering == Ordering::Greater,
        }
    }
}

/// A leaf comparing the attribute named `key` against a fixed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparison {
    pub op: ComparisonOp,
    pub key: String,
    pub value: AttributeValue,
}

impl Comparison {
    /// Any string is accepted as a key. [`Display`](std::fmt::Display) writes
    /// the key as is, so only keys matching `[A-Za-z_][A-Za-z0-9_.]*` survive a
    /// round trip through the infix syntax. The codec carries every key.
    pub fn new(op: ComparisonOp, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            op,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Evaluates the leaf.
    ///
    /// A missing attribute makes the comparison false whatever the operator. An
    /// attribute of another kind than `value` is a [`Error::TypeMismatch`].
    pub fn eval<A: AttributeSource + ?Sized>(&self, attrs: &A) -> BetResult<bool> {
        let Some(attribute) = attrs.attribute(&self.key) else {
            return Ok(false);
        };

        match attribute.partial_cmp(&self.value) {
            Some(ordering) => Ok(self.op.holds(ordering)),
            None => {
                debug!(
                    "type mismatch on `{}`: leaf holds {}, attribute holds {}",
                    self.key,
                    self.value.kind(),
                    attribute.kind()
                );
                Err(Error::TypeMismatch {
                    key: self.key.clone(),
                    expected: self.value.kind(),
                    found: attribute.kind(),
                })
            }
        }
    }
}

/// A boolean expression tree. Each child is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Serialize, Deserialize)]
pub enum LogicalNode {
    And(Box<LogicalNode>, Box<LogicalNode>),
    Or(Box<LogicalNode>, Box<LogicalNode>),
    Not(Box<LogicalNode>),
    Comparison(Comparison),
}

impl LogicalNode {
    /// Evaluates the tree against `attrs`.
    ///
    /// Both operands of `&&` and `||` are always evaluated, so a type mismatch
    /// anywhere in the tree is reported regardless of the other operand's value.
    pub fn eval<A: AttributeSource + ?Sized>(&self, attrs: &A) -> BetResult<bool> {
        match self {
            LogicalNode::And(left, right) => {
                let left = left.eval(attrs)?;
                let right = right.eval(attrs)?;
                Ok(left && right)
            }
            LogicalNode::Or(left, right) => {
                let left = left.eval(attrs)?;
                let right = right.eval(attrs)?;
                Ok(left || right)
            }
            LogicalNode::Not(child) => Ok(!child.eval(attrs)?),
            LogicalNode::Comparison(comparison) => comparison.eval(attrs),
        }
    }

    /// Number of nodes on the longest root-to-leaf path. A single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            LogicalNode::And(left, right) | LogicalNode::Or(left, right) => {
                1 + left.depth().max(right.depth())
            }
            LogicalNode::Not(child) => 1 + child.depth(),
            LogicalNode::Comparison(_) => 1,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            LogicalNode::And(left, right) | LogicalNode::Or(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
            LogicalNode::Not(child) => child.leaf_count(),
            LogicalNode::Comparison(_) => 1,
        }
    }

    pub fn as_comparison(&self) -> Option<&Comparison> {
        match self {
            LogicalNode::Comparison(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Comparison> for LogicalNode {
    fn from(value: Comparison) -> Self {
        LogicalNode::Comparison(value)
    }
}

/// `left && right`
pub fn and(left: LogicalNode, right: LogicalNode) -> LogicalNode {
    LogicalNode::And(Box::new(left), Box::new(right))
}

/// `left || right`
pub fn or(left: LogicalNode, right: LogicalNode) -> LogicalNode {
    LogicalNode::Or(Box::new(left), Box::new(right))
}

/// `!inner`
pub fn not(inner: LogicalNode) -> LogicalNode {
    LogicalNode::Not(Box::new(inner))
}

/// `key == value`
pub fn eq(key: impl Into<String>, value: impl Into<AttributeValue>) -> LogicalNode {
    Comparison::new(ComparisonOp::Eq, key, value).into()
}

/// `key != value`
pub fn not_eq(key: impl Into<String>, value: impl Into<AttributeValue>) -> LogicalNode {
    Comparison::new(ComparisonOp::NotEq, key, value).into()
}

/// `key < value`
pub fn lt(key: impl Into<String>, value: impl Into<AttributeValue>) -> LogicalNode {
    Comparison::new(ComparisonOp::Lt, key, value).into()
}

/// `key > value`
pub fn gt(key: impl Into<String>, value: impl Into<AttributeValue>) -> LogicalNode {
    Comparison::new(ComparisonOp::Gt, key, value).into()
}
