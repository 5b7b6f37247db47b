use std::fmt;

use super::error::ParseError;

/// Canonical symbols of the formula language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    And,
    Or,
    Implies,
    Not,
    ForAll,
    Exists,
    Equals,
    NotEquals,
    LParen,
    RParen,
    Dot,
    Comma,
    /// Synthetic end of input, never produced from text
    Eof,
}

/// Symbol table in matching priority order. The first synonym that
/// prefixes the remaining input wins, so multi-character operators must
/// come before any shorter symbol they overlap with.
const SYMBOL_TABLE: &[(Symbol, &[&str])] = &[
    (Symbol::And, &["^", "and", "&"]),
    (Symbol::Or, &["v", "or", "|"]),
    (Symbol::Implies, &["->", "implies"]),
    (Symbol::Not, &["~", "not"]),
    (Symbol::ForAll, &["forall", "A"]),
    (Symbol::Exists, &["exists", "E"]),
    (Symbol::Equals, &["==", "equals"]),
    (Symbol::NotEquals, &["!=", "=/="]),
    (Symbol::LParen, &["("]),
    (Symbol::RParen, &[")"]),
    (Symbol::Dot, &["."]),
    (Symbol::Comma, &[","]),
];

impl Symbol {
    /// Canonical spelling, the text every synonym normalizes to
    pub fn name(self) -> &'static str {
        match self {
            Symbol::And => "^",
            Symbol::Or => "v",
            Symbol::Implies => "->",
            Symbol::Not => "~",
            Symbol::ForAll => "forall",
            Symbol::Exists => "exists",
            Symbol::Equals => "==",
            Symbol::NotEquals => "!=",
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::Dot => ".",
            Symbol::Comma => ",",
            Symbol::Eof => "EOF",
        }
    }

    /// All surface spellings accepted for this symbol
    pub fn synonyms(self) -> &'static [&'static str] {
        SYMBOL_TABLE
            .iter()
            .find(|(symbol, _)| *symbol == self)
            .map(|(_, synonyms)| *synonyms)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Symbol(Symbol),
    Identifier(String),
}

/// A lexed token. Equality only considers the kind, never the position or
/// which synonym was read.
#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    lexeme: String,
    offset: Option<usize>,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Token {}

impl Token {
    /// A symbol token that did not come from source text
    pub fn symbol(symbol: Symbol) -> Self {
        Token {
            kind: TokenKind::Symbol(symbol),
            lexeme: symbol.name().to_string(),
            offset: None,
        }
    }

    /// An identifier token that did not come from source text
    pub fn identifier(name: impl Into<String>) -> Self {
        let name = name.into();
        Token {
            lexeme: name.clone(),
            kind: TokenKind::Identifier(name),
            offset: None,
        }
    }

    pub(crate) fn eof() -> Self {
        Token::symbol(Symbol::Eof)
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Canonical text: the symbol name or the identifier itself
    pub fn text(&self) -> &str {
        match &self.kind {
            TokenKind::Symbol(symbol) => symbol.name(),
            TokenKind::Identifier(name) => name,
        }
    }

    /// Surface text as read from the input
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Character offset of the first character, `None` for synthetic tokens
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self.kind {
            TokenKind::Symbol(symbol) => Some(symbol),
            TokenKind::Identifier(_) => None,
        }
    }

    pub fn is_symbol(&self, symbols: &[Symbol]) -> bool {
        self.as_symbol().is_some_and(|s| symbols.contains(&s))
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier(_))
    }

    /// Caret line underlining this token, empty for synthetic tokens
    pub fn squiggles(&self) -> String {
        match self.offset {
            Some(offset) => format!(
                "{}{}",
                " ".repeat(offset),
                "^".repeat(self.lexeme.chars().count().max(1))
            ),
            None => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TokenKind::Symbol(_) => "symbol",
            TokenKind::Identifier(_) => "identifier",
        };
        match self.offset {
            Some(offset) => write!(f, "'{}' ({}, {})", self.text(), kind, offset),
            None => write!(f, "'{}' ({}, -1)", self.text(), kind),
        }
    }
}

/// Single-reader cursor over a token sequence. Reads past the end yield a
/// synthetic EOF symbol.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl TokenStream {
    fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens,
            pos: 0,
            eof: Token::eof(),
        }
    }

    pub fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Look `i` tokens ahead of the cursor
    pub fn peek_at(&self, i: usize) -> &Token {
        self.tokens.get(self.pos + i).unwrap_or(&self.eof)
    }

    pub fn get(&mut self) -> Token {
        let token = self.peek().clone();
        self.pos += 1;
        token
    }

    pub fn discard(&mut self) {
        self.pos += 1;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

fn symbol_token(rest: &str, offset: usize) -> Option<Token> {
    SYMBOL_TABLE.iter().find_map(|(symbol, synonyms)| {
        synonyms
            .iter()
            .find(|synonym| rest.starts_with(**synonym))
            .map(|synonym| Token {
                kind: TokenKind::Symbol(*symbol),
                lexeme: synonym.to_string(),
                offset: Some(offset),
            })
    })
}

fn identifier_token(rest: &str, offset: usize) -> Option<Token> {
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let name = &rest[..end];
    Some(Token {
        kind: TokenKind::Identifier(name.to_string()),
        lexeme: name.to_string(),
        offset: Some(offset),
    })
}

/// Split `input` into tokens, normalizing symbol synonyms.
pub fn tokenize(input: &str) -> Result<TokenStream, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        // byte offset into input; char offset is what carets are drawn with
        let byte_offset = input.len() - rest.len();
        let offset = input[..byte_offset].chars().count();

        let token = symbol_token(rest, offset)
            .or_else(|| identifier_token(rest, offset))
            .ok_or_else(|| ParseError::tokenize(input, byte_offset, rest))?;

        log::trace!("token {}", token);
        rest = rest[token.lexeme.len()..].trim_start();
        tokens.push(token);
    }

    Ok(TokenStream::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.kind().clone())
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn synonyms_normalize_to_canonical_symbol() {
        assert_eq!(
            kinds("a and b & c ^ d"),
            vec![
                ident("a"),
                TokenKind::Symbol(Symbol::And),
                ident("b"),
                TokenKind::Symbol(Symbol::And),
                ident("c"),
                TokenKind::Symbol(Symbol::And),
                ident("d"),
            ]
        );
        assert_eq!(
            kinds("not p implies q or r"),
            vec![
                TokenKind::Symbol(Symbol::Not),
                ident("p"),
                TokenKind::Symbol(Symbol::Implies),
                ident("q"),
                TokenKind::Symbol(Symbol::Or),
                ident("r"),
            ]
        );
        assert_eq!(
            kinds("x =/= y equals z"),
            vec![
                ident("x"),
                TokenKind::Symbol(Symbol::NotEquals),
                ident("y"),
                TokenKind::Symbol(Symbol::Equals),
                ident("z"),
            ]
        );
    }

    #[test]
    fn offsets_track_source_positions() {
        let stream = tokenize("  forall x. P(x)").unwrap();
        let offsets: Vec<_> = stream.tokens().iter().map(|t| t.offset()).collect();
        assert_eq!(
            offsets,
            vec![Some(2), Some(9), Some(10), Some(12), Some(13), Some(14), Some(15)]
        );
        assert_eq!(stream.tokens()[0].lexeme(), "forall");
    }

    #[test]
    fn quantifier_shorthands() {
        assert_eq!(
            kinds("A x. E y. R(x, y)")[..4],
            [
                TokenKind::Symbol(Symbol::ForAll),
                ident("x"),
                TokenKind::Symbol(Symbol::Dot),
                TokenKind::Symbol(Symbol::Exists),
            ]
        );
    }

    #[test]
    fn symbols_take_priority_over_identifiers() {
        // table order decides: a leading `v` is always the disjunction symbol
        assert_eq!(kinds("vx"), vec![TokenKind::Symbol(Symbol::Or), ident("x")]);
        // identifiers are maximal runs once started
        assert_eq!(kinds("xvy"), vec![ident("xvy")]);
    }

    #[test]
    fn digits_are_rejected() {
        let err = tokenize("f(x, 1)").unwrap_err();
        assert!(matches!(err, ParseError::Tokenize { ref remaining, .. } if remaining == "1)"));
    }

    #[test]
    fn lookahead_past_end_yields_eof() {
        let mut stream = tokenize("a").unwrap();
        assert!(stream.peek().is_identifier());
        stream.discard();
        assert!(stream.peek().is_symbol(&[Symbol::Eof]));
        assert_eq!(stream.peek().offset(), None);
        assert!(stream.peek_at(5).is_symbol(&[Symbol::Eof]));
        assert_eq!(stream.get(), Token::symbol(Symbol::Eof));
    }

    #[test]
    fn tokens_compare_by_kind_and_text() {
        let stream = tokenize("and &").unwrap();
        assert_eq!(stream.tokens()[0], stream.tokens()[1]);
        assert_eq!(stream.tokens()[0], Token::symbol(Symbol::And));
        assert_ne!(Token::identifier("v"), Token::symbol(Symbol::Or));
    }

    #[test]
    fn squiggles_underline_the_lexeme() {
        let stream = tokenize("p implies q").unwrap();
        assert_eq!(stream.tokens()[1].squiggles(), "  ^^^^^^^");
        assert_eq!(Token::eof().squiggles(), "");
    }
}
