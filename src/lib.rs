//! Parse, validate and evaluate first-order and propositional logic
//! formulas.
//!
//! ```
//! use logic_formula::{Formula, Model, Valuation};
//!
//! let formula = Formula::new("forall x. exists y. x != y").unwrap();
//! let model = Model::new([0, 1]);
//! assert_eq!(formula.evaluate(&model, &Valuation::new()), Ok(true));
//! ```

pub mod ast;
pub mod error;
pub mod eval;
mod formula;
pub mod parser;
pub mod validate;

pub use ast::{Node, NodeKind, Reference};
pub use error::FormulaError;
pub use eval::{EvalError, Evaluator, Model, Valuation, Value};
pub use formula::{Formula, FormulaOptions};
pub use parser::{parse, tokenize, ParseError};
pub use validate::{
    validate_formula, validate_language, validate_structure, Language, LanguageError,
    SignatureMode, StructureError,
};
