//! Renders a [`LogicalNode`] in the infix syntax accepted by the parser.
//!
//! Parentheses are emitted only where precedence or associativity requires
//! them (`||` < `&&` < `!` < comparison), so for trees whose keys are valid
//! identifiers, parsing the rendered text yields the same tree.
use super::LogicalNode;

fn precedence(node: &LogicalNode) -> u8 {
    match node {
        LogicalNode::Or(..) => 1,
        LogicalNode::And(..) => 2,
        LogicalNode::Not(..) => 3,
        LogicalNode::Comparison(..) => 255,
    }
}

/// Both `&&` and `||` are left-associative: a right child of the same
/// precedence must keep its parentheses.
#[inline]
fn requires_parens(child: &LogicalNode, parent: &LogicalNode, is_right: bool) -> bool {
    let (child, parent) = (precedence(child), precedence(parent));
    child < parent || (is_right && child == parent)
}

fn write_child(
    f: &mut std::fmt::Formatter<'_>,
    child: &LogicalNode,
    parent: &LogicalNode,
    is_right: bool,
) -> std::fmt::Result {
    if requires_parens(child, parent, is_right) {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

impl std::fmt::Display for LogicalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalNode::And(left, right) | LogicalNode::Or(left, right) => {
                let op = if self.is_and() { "&&" } else { "||" };
                write_child(f, left, self, false)?;
                write!(f, " {op} ")?;
                write_child(f, right, self, true)
            }
            LogicalNode::Not(child) if child.is_not() => write!(f, "!{child}"),
            LogicalNode::Not(child) => write!(f, "!({child})"),
            LogicalNode::Comparison(c) => write!(f, "{} {} {}", c.key, c.op, c.value),
        }
    }
}
