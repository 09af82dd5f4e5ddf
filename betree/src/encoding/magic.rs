//! Wire discriminants for [`EncodedNode`](super::EncodedNode).
//!
//! Conventions:
//! - Every node starts with one tag byte followed by its fields (prefix order).
//! - Combinators occupy `0x01..=0x0f` and are followed by their children.
//! - Leaves are `op << 4 | kind`, with `op` in `1..=4` (Eq, NotEq, Lt, Gt) and
//!   `kind` 0 for integers, 1 for text. They are followed by `key` then `value`.
//! - The table is append-only: a tag, once assigned, never changes meaning.

// Combinator tags
pub const N_AND: u8 = 0x01; // encode: OP left right
pub const N_OR: u8 = 0x02; // encode: OP left right
pub const N_NOT: u8 = 0x03; // encode: OP child

// Leaf tags
pub const C_EQ_INT: u8 = 0x10; // encode: OP key(string) value(i64)
pub const C_EQ_TEXT: u8 = 0x11; // encode: OP key(string) value(string)
pub const C_NOT_EQ_INT: u8 = 0x20;
pub const C_NOT_EQ_TEXT: u8 = 0x21;
pub const C_LT_INT: u8 = 0x30;
pub const C_LT_TEXT: u8 = 0x31;
pub const C_GT_INT: u8 = 0x40;
pub const C_GT_TEXT: u8 = 0x41;

/// Human-readable name of a tag, or `None` if the tag is not assigned.
pub fn tag_name(tag: u8) -> Option<&'static str> {
    Some(match tag {
        N_AND => "And",
        N_OR => "Or",
        N_NOT => "Not",
        C_EQ_INT => "EqInt",
        C_EQ_TEXT => "EqText",
        C_NOT_EQ_INT => "NotEqInt",
        C_NOT_EQ_TEXT => "NotEqText",
        C_LT_INT => "LtInt",
        C_LT_TEXT => "LtText",
        C_GT_INT => "GtInt",
        C_GT_TEXT => "GtText",
        _ => return None,
    })
}
