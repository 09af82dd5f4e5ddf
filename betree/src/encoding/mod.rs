//! The encoded (wire) form of a tree.
//!
//! [`EncodedNode`] mirrors [`LogicalNode`](crate::node::LogicalNode) with every
//! leaf value resolved to one concrete field type: there is one variant per
//! (operator, value kind) pair, so no field on the wire is dynamically typed.
//! The variant set is closed and each variant owns a fixed tag byte (see
//! [`magic`]); decoding a tag outside that set fails instead of guessing.
//!
//! Layout (borsh primitives: little-endian integers, `u32`-length-prefixed strings):
//!
//! ```text
//! And / Or : tag left right
//! Not      : tag child
//! leaves   : tag key:string value:(i64 | string)
//! ```
use std::io::{self, Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

pub mod magic;
pub mod projection;

/// Nesting accepted by [`BorshDeserialize`] for [`EncodedNode`] when no explicit
/// limit is given.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Key and monomorphic value of an encoded comparison leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct EncodedLeaf<T> {
    pub key: String,
    pub value: T,
}

impl<T> EncodedLeaf<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EncodedNode {
    And(Box<EncodedNode>, Box<EncodedNode>),
    Or(Box<EncodedNode>, Box<EncodedNode>),
    Not(Box<EncodedNode>),
    EqInt(EncodedLeaf<i64>),
    EqText(EncodedLeaf<String>),
    NotEqInt(EncodedLeaf<i64>),
    NotEqText(EncodedLeaf<String>),
    LtInt(EncodedLeaf<i64>),
    LtText(EncodedLeaf<String>),
    GtInt(EncodedLeaf<i64>),
    GtText(EncodedLeaf<String>),
}

/// Carried inside an [`io::Error`] when a tag outside [`magic`] is read.
#[derive(Debug, Error)]
#[error("unknown wire tag 0x{0:02x}")]
pub(crate) struct UnknownTag(pub u8);

/// Carried inside an [`io::Error`] when the depth limit is hit.
#[derive(Debug, Error)]
#[error("encoded tree nests deeper than {0}")]
pub(crate) struct DepthLimit(pub usize);

impl EncodedNode {
    /// The wire discriminant of this node.
    pub fn tag(&self) -> u8 {
        match self {
            EncodedNode::And(..) => magic::N_AND,
            EncodedNode::Or(..) => magic::N_OR,
            EncodedNode::Not(_) => magic::N_NOT,
            EncodedNode::EqInt(_) => magic::C_EQ_INT,
            EncodedNode::EqText(_) => magic::C_EQ_TEXT,
            EncodedNode::NotEqInt(_) => magic::C_NOT_EQ_INT,
            EncodedNode::NotEqText(_) => magic::C_NOT_EQ_TEXT,
            EncodedNode::LtInt(_) => magic::C_LT_INT,
            EncodedNode::LtText(_) => magic::C_LT_TEXT,
            EncodedNode::GtInt(_) => magic::C_GT_INT,
            EncodedNode::GtText(_) => magic::C_GT_TEXT,
        }
    }

    /// Children of a combinator, in wire order. Leaves have none.
    pub fn children(&self) -> Vec<&EncodedNode> {
        match self {
            EncodedNode::And(left, right) | EncodedNode::Or(left, right) => vec![&**left, &**right],
            EncodedNode::Not(child) => vec![&**child],
            _ => Vec::new(),
        }
    }

    /// Reads one node, rejecting trees that nest deeper than `max_depth`.
    ///
    /// The root sits at depth 1. Combinators waiting for their children are
    /// kept on an explicit stack, so the call depth does not grow with the tree.
    pub fn deserialize_bounded<R: Read>(reader: &mut R, max_depth: usize) -> io::Result<Self> {
        let mut pending: Vec<Pending> = Vec::new();

        loop {
            // The node about to be read sits at depth `pending.len() + 1`
            if pending.len() >= max_depth {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    DepthLimit(max_depth),
                ));
            }

            let tag = u8::deserialize_reader(reader)?;
            let mut node = match tag {
                magic::N_AND => {
                    pending.push(Pending::And(None));
                    continue;
                }
                magic::N_OR => {
                    pending.push(Pending::Or(None));
                    continue;
                }
                magic::N_NOT => {
                    pending.push(Pending::Not);
                    continue;
                }
                tag => Self::read_leaf(reader, tag)?,
            };

            // Attach the completed node to its parents until one still needs a child
            loop {
                match pending.pop() {
                    None => return Ok(node),
                    Some(Pending::Not) => node = EncodedNode::Not(Box::new(node)),
                    Some(Pending::And(None)) => {
                        pending.push(Pending::And(Some(node)));
                        break;
                    }
                    Some(Pending::Or(None)) => {
                        pending.push(Pending::Or(Some(node)));
                        break;
                    }
                    Some(Pending::And(Some(left))) => {
                        node = EncodedNode::And(Box::new(left), Box::new(node))
                    }
                    Some(Pending::Or(Some(left))) => {
                        node = EncodedNode::Or(Box::new(left), Box::new(node))
                    }
                }
            }
        }
    }

    #[inline(never)]
    fn read_leaf<R: Read>(reader: &mut R, tag: u8) -> io::Result<Self> {
        Ok(match tag {
            magic::C_EQ_INT => EncodedNode::EqInt(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_EQ_TEXT => EncodedNode::EqText(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_NOT_EQ_INT => EncodedNode::NotEqInt(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_NOT_EQ_TEXT => {
                EncodedNode::NotEqText(EncodedLeaf::deserialize_reader(reader)?)
            }
            magic::C_LT_INT => EncodedNode::LtInt(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_LT_TEXT => EncodedNode::LtText(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_GT_INT => EncodedNode::GtInt(EncodedLeaf::deserialize_reader(reader)?),
            magic::C_GT_TEXT => EncodedNode::GtText(EncodedLeaf::deserialize_reader(reader)?),
            unknown => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    UnknownTag(unknown),
                ));
            }
        })
    }
}

/// A combinator read from the wire whose children are not complete yet.
/// Binary combinators hold their left child once it is done.
enum Pending {
    And(Option<EncodedNode>),
    Or(Option<EncodedNode>),
    Not,
}

impl BorshSerialize for EncodedNode {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.tag().serialize(writer)?;
        match self {
            EncodedNode::And(left, right) | EncodedNode::Or(left, right) => {
                left.serialize(writer)?;
                right.serialize(writer)
            }
            EncodedNode::Not(child) => child.serialize(writer),
            EncodedNode::EqInt(leaf)
            | EncodedNode::NotEqInt(leaf)
            | EncodedNode::LtInt(leaf)
            | EncodedNode::GtInt(leaf) => leaf.serialize(writer),
            EncodedNode::EqText(leaf)
            | EncodedNode::NotEqText(leaf)
            | EncodedNode::LtText(leaf)
            | EncodedNode::GtText(leaf) => leaf.serialize(writer),
        }
    }
}

impl BorshDeserialize for EncodedNode {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        Self::deserialize_bounded(reader, DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_leaf() -> EncodedNode {
        EncodedNode::EqText(EncodedLeaf::new("val1", "1".to_string()))
    }

    #[test]
    fn leaf_layout_is_tag_key_value() {
        let bytes = borsh::to_vec(&text_leaf()).unwrap();
        assert_eq!(
            bytes,
            [
                magic::C_EQ_TEXT,
                4, 0, 0, 0, b'v', b'a', b'l', b'1',
                1, 0, 0, 0, b'1',
            ]
        );

        let bytes = borsh::to_vec(&EncodedNode::GtInt(EncodedLeaf::new("a", -2))).unwrap();
        assert_eq!(
            bytes,
            [
                magic::C_GT_INT,
                1, 0, 0, 0, b'a',
                0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            ]
        );
    }

    #[test]
    fn combinators_are_prefix_ordered() {
        let node = EncodedNode::Not(Box::new(EncodedNode::Or(
            Box::new(text_leaf()),
            Box::new(text_leaf()),
        )));
        let bytes = borsh::to_vec(&node).unwrap();
        assert_eq!(&bytes[..3], &[magic::N_NOT, magic::N_OR, magic::C_EQ_TEXT]);

        let decoded: EncodedNode = borsh::from_slice(&bytes).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = borsh::from_slice::<EncodedNode>(&[0x7f]).unwrap_err();
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<UnknownTag>());
        assert_eq!(inner.map(|t| t.0), Some(0x7f));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let node = EncodedNode::Not(Box::new(EncodedNode::Not(Box::new(text_leaf()))));
        let bytes = borsh::to_vec(&node).unwrap();

        let mut slice = bytes.as_slice();
        assert!(EncodedNode::deserialize_bounded(&mut slice, 3).is_ok());

        let mut slice = bytes.as_slice();
        let err = EncodedNode::deserialize_bounded(&mut slice, 2).unwrap_err();
        assert!(err.get_ref().is_some_and(|e| e.is::<DepthLimit>()));
    }

    #[test]
    fn chain_at_the_depth_limit_is_read_back() {
        let mut bytes = vec![magic::N_NOT; DEFAULT_MAX_DEPTH - 1];
        bytes.extend(borsh::to_vec(&text_leaf()).unwrap());

        let mut slice = bytes.as_slice();
        let mut node = EncodedNode::deserialize_bounded(&mut slice, DEFAULT_MAX_DEPTH).unwrap();
        assert!(slice.is_empty());

        let mut depth = 1;
        while let EncodedNode::Not(child) = node {
            node = *child;
            depth += 1;
        }
        assert_eq!(depth, DEFAULT_MAX_DEPTH);
        assert_eq!(node, text_leaf());

        let mut bytes = vec![magic::N_NOT; DEFAULT_MAX_DEPTH];
        bytes.extend(borsh::to_vec(&text_leaf()).unwrap());
        let err = borsh::from_slice::<EncodedNode>(&bytes).unwrap_err();
        assert!(err.get_ref().is_some_and(|e| e.is::<DepthLimit>()));
    }

    #[test]
    fn binary_children_keep_their_order() {
        let left = EncodedNode::EqInt(EncodedLeaf::new("l", 1));
        let right = EncodedNode::Not(Box::new(EncodedNode::GtText(EncodedLeaf::new(
            "r",
            "z".to_string(),
        ))));
        let node = EncodedNode::And(
            Box::new(EncodedNode::Or(Box::new(left.clone()), Box::new(right.clone()))),
            Box::new(right),
        );
        let bytes = borsh::to_vec(&node).unwrap();
        assert_eq!(borsh::from_slice::<EncodedNode>(&bytes).unwrap(), node);
    }

    #[test]
    fn truncated_leaf_is_an_error() {
        let bytes = borsh::to_vec(&text_leaf()).unwrap();
        assert!(borsh::from_slice::<EncodedNode>(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn every_tag_has_a_name() {
        let leaf_i = EncodedLeaf::new("k", 0);
        let leaf_t = EncodedLeaf::new("k", String::new());
        let nodes = [
            EncodedNode::EqInt(leaf_i.clone()),
            EncodedNode::EqText(leaf_t.clone()),
            EncodedNode::NotEqInt(leaf_i.clone()),
            EncodedNode::NotEqText(leaf_t.clone()),
            EncodedNode::LtInt(leaf_i.clone()),
            EncodedNode::LtText(leaf_t.clone()),
            EncodedNode::GtInt(leaf_i),
            EncodedNode::GtText(leaf_t),
        ];
        let mut tags: Vec<u8> = nodes.iter().map(EncodedNode::tag).collect();
        tags.extend([magic::N_AND, magic::N_OR, magic::N_NOT]);
        for tag in &tags {
            assert!(magic::tag_name(*tag).is_some(), "tag 0x{tag:02x}");
        }
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 11);
        assert_eq!(magic::tag_name(0x00), None);
    }
}
