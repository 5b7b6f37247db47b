//! Formula syntax tree.
//!
//! Every node carries the token that produced it and a fixed number of
//! children for its kind. Quantifiers bind their variable at construction
//! time by rewriting free occurrences in the body to de Bruijn indices, so
//! structural equality is equality up to renaming of bound variables.

pub mod build;
mod unparse;

use std::fmt;
use std::mem;

use thiserror::Error;

use crate::parser::tokenizer::Token;

/// Payload of a variable: its name while free, its binder distance once a
/// quantifier has captured it (0 = innermost enclosing quantifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Free(String),
    Bound(usize),
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Variable(Reference),
    Function,
    Predicate,
    And,
    Or,
    Implication,
    Equality,
    Inequality,
    Not,
    /// Carries the token of the bound identifier
    ForAll(Token),
    Exists(Token),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("Cannot access '{accessor}' of a node with {arity} children")]
    WrongArity { accessor: &'static str, arity: usize },
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    token: Token,
    children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, token: Token, children: Vec<Node>) -> Self {
        Node {
            kind,
            token,
            children,
        }
    }

    pub fn variable(identifier: Token) -> Self {
        let reference = Reference::Free(identifier.text().to_string());
        Node::new(NodeKind::Variable(reference), identifier, Vec::new())
    }

    pub fn function(identifier: Token, args: Vec<Node>) -> Self {
        Node::new(NodeKind::Function, identifier, args)
    }

    pub fn predicate(identifier: Token, args: Vec<Node>) -> Self {
        Node::new(NodeKind::Predicate, identifier, args)
    }

    pub fn and(op: Token, lhs: Node, rhs: Node) -> Self {
        Node::new(NodeKind::And, op, vec![lhs, rhs])
    }

    pub fn or(op: Token, lhs: Node, rhs: Node) -> Self {
        Node::new(NodeKind::Or, op, vec![lhs, rhs])
    }

    pub fn implication(op: Token, lhs: Node, rhs: Node) -> Self {
        Node::new(NodeKind::Implication, op, vec![lhs, rhs])
    }

    pub fn equality(op: Token, lhs: Node, rhs: Node) -> Self {
        Node::new(NodeKind::Equality, op, vec![lhs, rhs])
    }

    pub fn inequality(op: Token, lhs: Node, rhs: Node) -> Self {
        Node::new(NodeKind::Inequality, op, vec![lhs, rhs])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(op: Token, operand: Node) -> Self {
        Node::new(NodeKind::Not, op, vec![operand])
    }

    /// Universal quantifier; free occurrences of `bound` in `body` become
    /// references to this binder.
    pub fn for_all(op: Token, bound: Token, mut body: Node) -> Self {
        body.bind(bound.text(), 0);
        Node::new(NodeKind::ForAll(bound), op, vec![body])
    }

    pub fn exists(op: Token, bound: Token, mut body: Node) -> Self {
        body.bind(bound.text(), 0);
        Node::new(NodeKind::Exists(bound), op, vec![body])
    }

    fn bind(&mut self, name: &str, depth: usize) {
        let child_depth = match &mut self.kind {
            NodeKind::Variable(reference) => {
                if matches!(reference, Reference::Free(free) if free == name) {
                    *reference = Reference::Bound(depth);
                }
                return;
            }
            NodeKind::ForAll(_) | NodeKind::Exists(_) => depth + 1,
            _ => depth,
        };
        for child in &mut self.children {
            child.bind(name, child_depth);
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Operator or identifier token this node was built from
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Variable payload, `None` for every other kind
    pub fn reference(&self) -> Option<&Reference> {
        match &self.kind {
            NodeKind::Variable(reference) => Some(reference),
            _ => None,
        }
    }

    /// Identifier token bound by a quantifier
    pub fn bound_token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::ForAll(bound) | NodeKind::Exists(bound) => Some(bound),
            _ => None,
        }
    }

    pub fn is_term(&self) -> bool {
        matches!(self.kind, NodeKind::Variable(_) | NodeKind::Function)
    }

    pub fn is_formula(&self) -> bool {
        !self.is_term()
    }

    /// Variables and applications: nodes that never need grouping
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Variable(_) | NodeKind::Function | NodeKind::Predicate
        )
    }

    pub fn left(&self) -> Result<&Node, AstError> {
        self.binary("left").map(|(lhs, _)| lhs)
    }

    pub fn right(&self) -> Result<&Node, AstError> {
        self.binary("right").map(|(_, rhs)| rhs)
    }

    pub fn child(&self) -> Result<&Node, AstError> {
        match self.children.as_slice() {
            [child] => Ok(child),
            children => Err(AstError::WrongArity {
                accessor: "child",
                arity: children.len(),
            }),
        }
    }

    fn binary(&self, accessor: &'static str) -> Result<(&Node, &Node), AstError> {
        match self.children.as_slice() {
            [lhs, rhs] => Ok((lhs, rhs)),
            children => Err(AstError::WrongArity {
                accessor,
                arity: children.len(),
            }),
        }
    }

    /// Visit this node, then its children left to right
    pub fn preorder<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.preorder(f);
        }
    }

    /// Names of free variables in order of first occurrence
    pub fn free_variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.preorder(&mut |node| {
            if let Some(Reference::Free(name)) = node.reference() {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        });
        names
    }

    /// True when no free variable in this subtree is called `name`
    pub fn is_fresh(&self, name: &str) -> bool {
        match &self.kind {
            NodeKind::Variable(Reference::Free(free)) => free != name,
            _ => self.children.iter().all(|child| child.is_fresh(name)),
        }
    }

    /// Indented one-line-per-node dump of the tree
    pub fn tree(&self) -> Tree<'_> {
        Tree(self)
    }

    /// Minimal, correctly parenthesized source text for this node
    pub fn unparse(&self) -> String {
        self.to_string()
    }
}

/// Structural equality: same kind, same canonical token text (a bound
/// variable compares by index) and pairwise equal children. Source offsets
/// and the names of bound identifiers are ignored.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let same_head = match (&self.kind, &other.kind) {
            (NodeKind::Variable(a), NodeKind::Variable(b)) => a == b,
            (NodeKind::ForAll(_), NodeKind::ForAll(_))
            | (NodeKind::Exists(_), NodeKind::Exists(_)) => true,
            (a, b) => mem::discriminant(a) == mem::discriminant(b) && self.token == other.token,
        };
        same_head && self.children == other.children
    }
}

impl Eq for Node {}

pub struct Tree<'a>(&'a Node);

impl Tree<'_> {
    fn write(node: &Node, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{}", "  ".repeat(depth), node.token)?;
        match &node.kind {
            NodeKind::Variable(Reference::Bound(index)) => write!(f, " #{}", index)?,
            NodeKind::ForAll(bound) | NodeKind::Exists(bound) => write!(f, " {}", bound.text())?,
            _ => {}
        }
        writeln!(f)?;
        for child in &node.children {
            Self::write(child, f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write(self.0, f, 0)
    }
}
