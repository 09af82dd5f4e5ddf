//! Attribute values and the maps they are looked up in.
//!
//! The value set is closed: an attribute is either a 64-bit signed integer or a
//! piece of text. Values of different kinds never compare with each other; asking
//! for an ordering across kinds yields `None`, which evaluation turns into a
//! type-mismatch fault.
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Signed 64-bit integer, ordered numerically.
    Integer(i64),
    /// UTF-8 text, ordered lexically (byte-wise).
    Text(String),
}

/// The tag of an [`AttributeValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Text,
}

impl AttributeValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AttributeValue::Integer(_) => ValueKind::Integer,
            AttributeValue::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Integer(_) => None,
            AttributeValue::Text(s) => Some(s),
        }
    }
}

impl PartialOrd for AttributeValue {
    /// Ordering is only defined between values of the same kind.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (AttributeValue::Integer(a), AttributeValue::Integer(b)) => Some(a.cmp(b)),
            (AttributeValue::Text(a), AttributeValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    /// Renders the value as a literal of the expression language.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{v}"),
            AttributeValue::Text(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// The default attribute map handed to [`LogicalNode::eval`](crate::node::LogicalNode::eval).
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Anything attributes can be looked up in by name.
///
/// Trees never retain the source they are evaluated against.
pub trait AttributeSource {
    fn attribute(&self, key: &str) -> Option<&AttributeValue>;
}

impl<S: BuildHasher> AttributeSource for HashMap<String, AttributeValue, S> {
    fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.get(key)
    }
}

impl AttributeSource for BTreeMap<String, AttributeValue> {
    fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.get(key)
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        (*self).attribute(key)
    }
}
