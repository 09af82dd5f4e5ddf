//! Betree: boolean expression trees over typed attributes.
//!
//! A predicate is built (or parsed) once as a [`node::LogicalNode`], evaluated
//! any number of times against attribute maps, and shipped between processes
//! as a compact, self-contained byte blob.
//!
//! Layers
//!  - [`value`]: the closed set of attribute values (64-bit integers and text).
//!  - [`node`]: the logical tree, its evaluation and its infix rendering.
//!  - [`encoding`]: the wire form, one variant per (operator, value kind), and
//!    the lossless projection between the two trees.
//!  - [`codec`]: borsh structured encoding wrapped in a zstd frame, with limits
//!    on everything read back.
//!  - [`parser`]: the infix front end (feature `chumsky`, on by default).
//!
//! Example
//! ```
//! use betree::prelude::*;
//!
//! let tree = parse(r#"val1 == "1" && !(val2 > 10)"#).unwrap();
//! let bytes = serialize(&tree).unwrap();
//! let tree = deserialize(&bytes).unwrap();
//!
//! let mut attrs = AttributeMap::new();
//! attrs.insert("val1".into(), "1".into());
//! attrs.insert("val2".into(), 3.into());
//! assert!(tree.eval(&attrs).unwrap());
//! ```

/// Transport codec and its configuration.
pub mod codec;
/// Wire form of a tree and the projection to and from it.
pub mod encoding;
/// Logical trees and their evaluation.
pub mod node;
/// Infix expression front end.
#[cfg(feature = "chumsky")]
pub mod parser;
/// Error types.
pub mod utils;
/// Attribute values.
pub mod value;

pub use utils::error::{BetResult, Error};

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::codec::{Codec, CodecConfig, deserialize, serialize};
    pub use crate::node::{Comparison, ComparisonOp, LogicalNode, and, eq, gt, lt, not, not_eq, or};
    #[cfg(feature = "chumsky")]
    pub use crate::parser::parse;
    pub use crate::utils::error::{BetResult, Error};
    pub use crate::value::{AttributeMap, AttributeSource, AttributeValue, ValueKind};
}
