pub mod error;
pub mod recursive;
pub mod tokenizer;

// Re-exports for clean API
pub use error::ParseError;
pub use recursive::FormulaParser;
pub use tokenizer::{tokenize, Symbol, Token, TokenKind, TokenStream};

use crate::ast::Node;

/// Parse a formula string into a syntax tree
pub fn parse(input: &str) -> Result<Node, ParseError> {
    FormulaParser::new(input)?.parse()
}
