use std::collections::BTreeMap;
use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolClass {
    Function,
    Predicate,
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolClass::Function => "function",
            SymbolClass::Predicate => "predicate",
        })
    }
}

/// How the signature pass treats names it has not seen before
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureMode {
    /// Record unseen names with the arity they are used with
    #[default]
    FillIn,
    /// Reject unseen names
    Strict,
}

/// Function and predicate arities, either declared up front or learned
/// from the formulas validated against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub functions: BTreeMap<String, usize>,
    #[serde(default)]
    pub predicates: BTreeMap<String, usize>,
}

impl Language {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.functions.insert(name.into(), arity);
        self
    }

    pub fn with_predicate(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.predicates.insert(name.into(), arity);
        self
    }

    pub fn arity(&self, class: SymbolClass, name: &str) -> Option<usize> {
        self.table(class).get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.predicates.is_empty()
    }

    fn table(&self, class: SymbolClass) -> &BTreeMap<String, usize> {
        match class {
            SymbolClass::Function => &self.functions,
            SymbolClass::Predicate => &self.predicates,
        }
    }

    fn table_mut(&mut self, class: SymbolClass) -> &mut BTreeMap<String, usize> {
        match class {
            SymbolClass::Function => &mut self.functions,
            SymbolClass::Predicate => &mut self.predicates,
        }
    }

    fn check(
        &mut self,
        class: SymbolClass,
        name: &str,
        found: usize,
        mode: SignatureMode,
    ) -> Result<(), LanguageError> {
        let table = self.table_mut(class);
        match (table.get(name).copied(), mode) {
            (Some(expected), _) if expected != found => Err(LanguageError::ArityMismatch {
                class,
                name: name.to_string(),
                expected,
                found,
            }),
            (Some(_), _) => Ok(()),
            (None, SignatureMode::FillIn) => {
                log::debug!("learned {} {}/{}", class, name, found);
                table.insert(name.to_string(), found);
                Ok(())
            }
            (None, SignatureMode::Strict) => Err(LanguageError::UnknownSymbol {
                class,
                name: name.to_string(),
                arity: found,
            }),
        }
    }
}

/// A well-formed tree whose symbol usage disagrees with the signature
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum LanguageError {
    #[error("Unknown {class} '{name}' (used with {arity} arguments)")]
    #[diagnostic(
        code(formula::unknown_symbol),
        help("Declare the symbol in the language, or validate in fill-in mode")
    )]
    UnknownSymbol {
        class: SymbolClass,
        name: String,
        arity: usize,
    },

    #[error("{class} '{name}' has arity {expected} but is used with {found} arguments")]
    #[diagnostic(code(formula::arity_mismatch))]
    ArityMismatch {
        class: SymbolClass,
        name: String,
        expected: usize,
        found: usize,
    },
}

impl LanguageError {
    /// The function or predicate name at fault
    pub fn name(&self) -> &str {
        match self {
            LanguageError::UnknownSymbol { name, .. } | LanguageError::ArityMismatch { name, .. } => {
                name
            }
        }
    }
}

/// Check every function and predicate application in `node` against
/// `language`.
///
/// The whole tree is walked in pre-order, left to right, and the first
/// failure in that order is returned. Names learned in fill-in mode are
/// committed to `language` only when the whole tree passes.
pub fn validate_language(
    node: &Node,
    language: &mut Language,
    mode: SignatureMode,
) -> Result<(), LanguageError> {
    let mut working = language.clone();
    let mut first_failure = None;

    node.preorder(&mut |n| {
        let class = match n.kind() {
            NodeKind::Function => SymbolClass::Function,
            NodeKind::Predicate => SymbolClass::Predicate,
            _ => return,
        };
        if let Err(e) = working.check(class, n.token().text(), n.children().len(), mode) {
            first_failure.get_or_insert(e);
        }
    });

    match first_failure {
        Some(e) => Err(e),
        None => {
            *language = working;
            Ok(())
        }
    }
}
