//! Checks over a parsed tree: term/formula discipline, then consistency
//! with a function/predicate signature.

pub mod language;
pub mod structure;

pub use language::{validate_language, Language, LanguageError, SignatureMode, SymbolClass};
pub use structure::{validate_formula, validate_structure, StructureError, Violation};
