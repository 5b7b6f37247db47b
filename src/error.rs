use miette::Diagnostic;
use thiserror::Error;

use crate::parser::ParseError;
use crate::validate::{LanguageError, StructureError};

/// Any failure turning text into a validated formula. The three kinds are
/// kept apart so callers can branch on them, e.g. retry a language error
/// in fill-in mode but give up on a parse error.
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum FormulaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Language(#[from] LanguageError),
}
