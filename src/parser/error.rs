use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::tokenizer::Token;

/// Malformed input text or grammar violation
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseError {
    #[error("Cannot tokenize input starting at: {remaining}")]
    #[diagnostic(
        code(formula::tokenize),
        help("Identifiers are ASCII letters only; symbols are ^ v -> ~ == != ( ) . , and their word forms")
    )]
    Tokenize {
        #[source_code]
        src: String,
        #[label("unrecognized input")]
        span: SourceSpan,
        remaining: String,
        /// Character offset of the first unrecognized character
        offset: usize,
    },

    #[error("{message}")]
    #[diagnostic(code(formula::syntax))]
    Unexpected {
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
        token: Token,
        message: String,
    },
}

/// Byte span of a token, pointing at the last character when the token is
/// the synthetic EOF so miette still has something to underline.
fn token_span(src: &str, token: &Token) -> SourceSpan {
    match token.offset() {
        Some(offset) => {
            let start = src
                .char_indices()
                .nth(offset)
                .map(|(i, _)| i)
                .unwrap_or(src.len());
            (start, token.lexeme().len().max(1)).into()
        }
        None => match src.char_indices().last() {
            Some((i, c)) => (i, c.len_utf8()).into(),
            None => (0, 0).into(),
        },
    }
}

impl ParseError {
    pub(crate) fn tokenize(src: &str, byte_offset: usize, remaining: &str) -> Self {
        let width = remaining.chars().next().map(char::len_utf8).unwrap_or(0);
        ParseError::Tokenize {
            src: src.to_string(),
            span: (byte_offset, width).into(),
            remaining: remaining.to_string(),
            offset: src[..byte_offset].chars().count(),
        }
    }

    pub(crate) fn unexpected(src: &str, token: Token, message: impl Into<String>) -> Self {
        ParseError::Unexpected {
            span: token_span(src, &token),
            src: src.to_string(),
            token,
            message: message.into(),
        }
    }

    /// The input string the error refers to
    pub fn source_text(&self) -> &str {
        match self {
            ParseError::Tokenize { src, .. } | ParseError::Unexpected { src, .. } => src,
        }
    }

    /// The offending token, if tokenizing got that far
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Tokenize { .. } => None,
            ParseError::Unexpected { token, .. } => Some(token),
        }
    }

    /// Caret line to print under the source text. A synthetic EOF token
    /// gets a single caret just past the end of the input.
    pub fn caret(&self) -> String {
        match self {
            ParseError::Tokenize { offset, .. } => format!("{}^", " ".repeat(*offset)),
            ParseError::Unexpected { src, token, .. } => match token.offset() {
                Some(_) => token.squiggles(),
                None => format!("{}^", " ".repeat(src.chars().count())),
            },
        }
    }

    /// Plain-text rendering: source, caret line, message
    pub fn render(&self) -> String {
        format!("{}\n{}\nParseError: {}", self.source_text(), self.caret(), self)
    }
}
