use std::fmt;

use itertools::Itertools;

use super::{Node, NodeKind};

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Whether `child` must be wrapped in parentheses to parse back as the same
/// tree when printed as an operand of `parent`.
fn needs_parens(parent: &NodeKind, child: &Node, side: Side) -> bool {
    use NodeKind::*;

    if child.is_atomic() || matches!(child.kind, Not) {
        return false;
    }
    if matches!(child.kind, ForAll(_) | Exists(_)) {
        return true;
    }

    let child_is_equality = matches!(child.kind, Equality | Inequality);
    match (parent, side) {
        // chains are left-nested and may not mix ^ with v
        (And, Side::Left) => !(child_is_equality || matches!(child.kind, And)),
        (Or, Side::Left) => !(child_is_equality || matches!(child.kind, Or)),
        (And | Or, Side::Right) => !child_is_equality,
        (Implication, Side::Left) => !(child_is_equality || matches!(child.kind, And | Or)),
        (Implication, Side::Right) => false,
        _ => true,
    }
}

struct Operand<'a> {
    node: &'a Node,
    parens: bool,
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parens {
            write!(f, "({})", self.node)
        } else {
            write!(f, "{}", self.node)
        }
    }
}

impl Node {
    fn operand<'a>(&self, child: &'a Node, side: Side) -> Operand<'a> {
        Operand {
            node: child,
            parens: needs_parens(&self.kind, child, side),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            // bound variables keep their original identifier token
            NodeKind::Variable(_) => f.write_str(self.token.text()),
            NodeKind::Function | NodeKind::Predicate => write!(
                f,
                "{}({})",
                self.token.text(),
                self.children
                    .iter()
                    .map(|arg| self.operand(arg, Side::Left))
                    .format(", ")
            ),
            NodeKind::And
            | NodeKind::Or
            | NodeKind::Implication
            | NodeKind::Equality
            | NodeKind::Inequality => {
                let (lhs, rhs) = (&self.children[0], &self.children[1]);
                write!(
                    f,
                    "{} {} {}",
                    self.operand(lhs, Side::Left),
                    self.token.text(),
                    self.operand(rhs, Side::Right)
                )
            }
            NodeKind::Not => write!(f, "~{}", self.operand(&self.children[0], Side::Left)),
            NodeKind::ForAll(bound) | NodeKind::Exists(bound) => {
                write!(f, "{} {}. {}", self.token.text(), bound.text(), self.children[0])
            }
        }
    }
}
