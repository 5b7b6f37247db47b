//! Token-free constructors, for building trees outside the parser
//! (tests, programmatic formulas, evaluation fixtures).

use super::Node;
use crate::parser::tokenizer::{Symbol, Token};

pub fn var(name: &str) -> Node {
    Node::variable(Token::identifier(name))
}

pub fn func(name: &str, args: Vec<Node>) -> Node {
    Node::function(Token::identifier(name), args)
}

pub fn pred(name: &str, args: Vec<Node>) -> Node {
    Node::predicate(Token::identifier(name), args)
}

pub fn and(lhs: Node, rhs: Node) -> Node {
    Node::and(Token::symbol(Symbol::And), lhs, rhs)
}

pub fn or(lhs: Node, rhs: Node) -> Node {
    Node::or(Token::symbol(Symbol::Or), lhs, rhs)
}

pub fn implies(lhs: Node, rhs: Node) -> Node {
    Node::implication(Token::symbol(Symbol::Implies), lhs, rhs)
}

pub fn eq(lhs: Node, rhs: Node) -> Node {
    Node::equality(Token::symbol(Symbol::Equals), lhs, rhs)
}

pub fn neq(lhs: Node, rhs: Node) -> Node {
    Node::inequality(Token::symbol(Symbol::NotEquals), lhs, rhs)
}

pub fn not(operand: Node) -> Node {
    Node::not(Token::symbol(Symbol::Not), operand)
}

pub fn forall(bound: &str, body: Node) -> Node {
    Node::for_all(Token::symbol(Symbol::ForAll), Token::identifier(bound), body)
}

pub fn exists(bound: &str, body: Node) -> Node {
    Node::exists(Token::symbol(Symbol::Exists), Token::identifier(bound), body)
}
