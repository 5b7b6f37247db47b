use std::fmt::{self, Debug};

use crate::ast::{Node, Tree};
use crate::error::FormulaError;
use crate::eval::{EvalError, Evaluator, Model, Valuation};
use crate::parser::parse;
use crate::validate::{validate_formula, validate_language, Language, SignatureMode};

/// How a formula is checked after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaOptions {
    /// Admit terms, equality, quantifiers and applications
    pub first_order: bool,
    pub mode: SignatureMode,
}

impl Default for FormulaOptions {
    fn default() -> Self {
        FormulaOptions {
            first_order: true,
            mode: SignatureMode::FillIn,
        }
    }
}

impl FormulaOptions {
    pub fn propositional() -> Self {
        FormulaOptions {
            first_order: false,
            ..Self::default()
        }
    }

    pub fn strict(self) -> Self {
        FormulaOptions {
            mode: SignatureMode::Strict,
            ..self
        }
    }
}

/// A parsed and fully validated formula together with its source text
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    ast: Node,
}

impl Formula {
    /// Parse and validate as a first-order formula, learning its signature
    /// into a fresh language.
    pub fn new(source: &str) -> Result<Self, FormulaError> {
        Self::with_options(source, &FormulaOptions::default(), &mut Language::new())
    }

    /// Parse, check structure, then check the signature against
    /// `language` (which fill-in mode may extend).
    pub fn with_options(
        source: &str,
        options: &FormulaOptions,
        language: &mut Language,
    ) -> Result<Self, FormulaError> {
        let ast = parse(source)?;
        validate_formula(&ast, options.first_order)?;
        validate_language(&ast, language, options.mode)?;
        log::info!("accepted formula {}", ast);
        Ok(Formula {
            source: source.to_string(),
            ast,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Node {
        &self.ast
    }

    pub fn into_ast(self) -> Node {
        self.ast
    }

    pub fn unparse(&self) -> String {
        self.ast.unparse()
    }

    pub fn tree(&self) -> Tree<'_> {
        self.ast.tree()
    }

    pub fn evaluate<V: Clone + PartialEq + Debug>(
        &self,
        model: &Model<V>,
        valuation: &Valuation<V>,
    ) -> Result<bool, EvalError> {
        Evaluator::new(model, valuation).truth(&self.ast)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}
