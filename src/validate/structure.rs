use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A connective or quantifier has a term where a formula belongs
    OperandNotFormula,
    /// An equality or application has a formula where a term belongs
    OperandNotTerm,
    /// Equality, quantifiers and applications outside first-order mode
    FirstOrderOnly,
    /// A bare term given as a whole first-order formula
    TermAsFormula,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Violation::OperandNotFormula => "operands must be formulas",
            Violation::OperandNotTerm => "operands must be terms",
            Violation::FirstOrderOnly => "only allowed in first-order formulas",
            Violation::TermAsFormula => "a term is not a formula",
        })
    }
}

/// A syntactically valid tree that breaks term/formula discipline
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
#[error("Invalid formula, {violation}: {subtree}")]
#[diagnostic(code(formula::structure))]
pub struct StructureError {
    pub violation: Violation,
    /// The subtree whose rule failed
    pub subtree: Node,
}

fn invalid(violation: Violation, node: &Node) -> Result<(), StructureError> {
    log::debug!("structure check failed at '{}': {}", node, violation);
    Err(StructureError {
        violation,
        subtree: node.clone(),
    })
}

/// Check a whole formula: everything `validate_structure` checks, plus in
/// first-order mode the root must not be a bare term.
pub fn validate_formula(root: &Node, first_order: bool) -> Result<(), StructureError> {
    if first_order && root.is_term() {
        return invalid(Violation::TermAsFormula, root);
    }
    validate_structure(root, first_order)
}

/// Check term/formula discipline for `node` and everything below it,
/// depth first, left to right.
///
/// Propositional mode (`first_order == false`) has no terms to speak of:
/// connectives accept any valid operand, while equality, quantifiers and
/// applications are rejected outright.
pub fn validate_structure(node: &Node, first_order: bool) -> Result<(), StructureError> {
    let all_formulas = node.children().iter().all(Node::is_formula);
    let all_terms = node.children().iter().all(Node::is_term);

    match node.kind() {
        NodeKind::Variable(_) => return Ok(()),
        NodeKind::And | NodeKind::Or | NodeKind::Implication | NodeKind::Not => {
            if first_order && !all_formulas {
                return invalid(Violation::OperandNotFormula, node);
            }
        }
        NodeKind::Equality | NodeKind::Inequality | NodeKind::Function | NodeKind::Predicate => {
            if !first_order {
                return invalid(Violation::FirstOrderOnly, node);
            }
            if !all_terms {
                return invalid(Violation::OperandNotTerm, node);
            }
        }
        NodeKind::ForAll(_) | NodeKind::Exists(_) => {
            if !first_order {
                return invalid(Violation::FirstOrderOnly, node);
            }
            if !all_formulas {
                return invalid(Violation::OperandNotFormula, node);
            }
        }
    }

    node.children()
        .iter()
        .try_for_each(|child| validate_structure(child, first_order))
}
