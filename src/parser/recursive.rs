use super::{
    error::ParseError,
    tokenizer::{tokenize, Symbol, Token, TokenKind, TokenStream},
};
use crate::ast::Node;

/// Application heads made of lowercase letters and digits are functions
fn is_function_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Application heads made of uppercase letters are predicates
fn is_predicate_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase())
}

/// Recursive-descent parser over a token stream.
///
/// Precedence from loosest to tightest: quantifier prefix, implication
/// (right associative), conjunction/disjunction chains (which may not mix
/// without parentheses), equality/inequality (non-chaining), negation,
/// atomic terms.
pub struct FormulaParser<'a> {
    source: &'a str,
    tokens: TokenStream,
}

impl<'a> FormulaParser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(FormulaParser {
            source,
            tokens: tokenize(source)?,
        })
    }

    /// Parse a complete formula; trailing tokens are an error.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let node = self.parse_quantifier()?;
        let next = self.tokens.peek();
        if !next.is_symbol(&[Symbol::Eof]) {
            return Err(self.error(next.clone(), format!("Unexpected token: {}", next)));
        }
        log::debug!("parsed '{}' as {}", self.source, node);
        Ok(node)
    }

    fn error(&self, token: Token, message: impl Into<String>) -> ParseError {
        ParseError::unexpected(self.source, token, message)
    }

    fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        let next = self.tokens.peek();
        if !next.is_identifier() {
            return Err(self.error(next.clone(), format!("Expected identifier, got {}", next)));
        }
        Ok(self.tokens.get())
    }

    fn expect_symbol(&mut self, symbols: &[Symbol]) -> Result<Token, ParseError> {
        let next = self.tokens.peek();
        if !next.is_symbol(symbols) {
            let expected = symbols
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(self.error(next.clone(), format!("Expected {}, got {}", expected, next)));
        }
        Ok(self.tokens.get())
    }

    fn parse_quantifier(&mut self) -> Result<Node, ParseError> {
        let Some(quantifier) = self
            .tokens
            .peek()
            .as_symbol()
            .filter(|s| matches!(s, Symbol::ForAll | Symbol::Exists))
        else {
            return self.parse_implication();
        };

        let op = self.tokens.get();
        let bound = self.expect_identifier()?;
        self.expect_symbol(&[Symbol::Dot])?;
        let body = self.parse_quantifier()?;

        Ok(match quantifier {
            Symbol::ForAll => Node::for_all(op, bound, body),
            _ => Node::exists(op, bound, body),
        })
    }

    fn parse_implication(&mut self) -> Result<Node, ParseError> {
        let lhs = self.parse_and_or()?;
        if !self.tokens.peek().is_symbol(&[Symbol::Implies]) {
            return Ok(lhs);
        }
        let op = self.tokens.get();
        let rhs = self.parse_implication()?;
        Ok(Node::implication(op, lhs, rhs))
    }

    fn parse_and_or(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_equality()?;
        let mut chain: Option<Symbol> = None;

        while let Some(symbol) = self
            .tokens
            .peek()
            .as_symbol()
            .filter(|s| matches!(s, Symbol::And | Symbol::Or))
        {
            let op = self.tokens.get();
            if chain.is_some_and(|previous| previous != symbol) {
                return Err(self.error(op, "Operators 'and' and 'or' should be explicitly grouped"));
            }
            chain = Some(symbol);

            let rhs = self.parse_equality()?;
            node = match symbol {
                Symbol::And => Node::and(op, node, rhs),
                _ => Node::or(op, node, rhs),
            };
        }

        Ok(node)
    }

    fn parse_equality(&mut self) -> Result<Node, ParseError> {
        let lhs = self.parse_term()?;
        match self.tokens.peek().as_symbol() {
            Some(Symbol::Equals) => {
                let op = self.tokens.get();
                Ok(Node::equality(op, lhs, self.parse_term()?))
            }
            Some(Symbol::NotEquals) => {
                let op = self.tokens.get();
                Ok(Node::inequality(op, lhs, self.parse_term()?))
            }
            _ => Ok(lhs),
        }
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let next = self.tokens.peek().clone();
        match next.kind() {
            TokenKind::Symbol(Symbol::LParen) => self.parse_bracketed(),
            TokenKind::Symbol(Symbol::Not) => {
                let op = self.tokens.get();
                Ok(Node::not(op, self.parse_term()?))
            }
            TokenKind::Identifier(_) => {
                let identifier = self.tokens.get();
                if self.tokens.peek().is_symbol(&[Symbol::LParen]) {
                    self.parse_application(identifier)
                } else {
                    Ok(Node::variable(identifier))
                }
            }
            TokenKind::Symbol(_) => Err(self.error(next.clone(), format!("Expected term, got {}", next))),
        }
    }

    fn parse_bracketed(&mut self) -> Result<Node, ParseError> {
        self.expect_symbol(&[Symbol::LParen])?;
        let node = self.parse_quantifier()?;
        self.expect_symbol(&[Symbol::RParen])?;
        Ok(node)
    }

    fn parse_application(&mut self, identifier: Token) -> Result<Node, ParseError> {
        let name = identifier.text();
        let build: fn(Token, Vec<Node>) -> Node = if is_function_name(name) {
            Node::function
        } else if is_predicate_name(name) {
            Node::predicate
        } else {
            let message = format!(
                "Identifier '{}' does not match function or predicate map",
                name
            );
            return Err(self.error(identifier, message));
        };

        self.expect_symbol(&[Symbol::LParen])?;
        let args = self.parse_args()?;
        self.expect_symbol(&[Symbol::RParen])?;
        Ok(build(identifier, args))
    }

    fn parse_args(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        if self.tokens.peek().is_symbol(&[Symbol::RParen]) {
            return Ok(args);
        }
        args.push(self.parse_term()?);
        while self.tokens.peek().is_symbol(&[Symbol::Comma]) {
            self.tokens.discard();
            args.push(self.parse_term()?);
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;
    use crate::ast::{NodeKind, Reference};
    use crate::parser::{parse, ParseError};

    fn message(input: &str) -> String {
        match parse(input).unwrap_err() {
            ParseError::Unexpected { message, .. } => message,
            other => panic!("expected grammar error, got {:?}", other),
        }
    }

    #[test]
    fn parses_propositional_connectives() {
        assert_eq!(
            parse("(a -> b) v (b -> a)").unwrap(),
            or(implies(var("a"), var("b")), implies(var("b"), var("a")))
        );
        assert_eq!(
            parse("a and b and c").unwrap(),
            and(and(var("a"), var("b")), var("c"))
        );
    }

    #[test]
    fn implication_associates_right() {
        assert_eq!(
            parse("a -> b -> c").unwrap(),
            implies(var("a"), implies(var("b"), var("c")))
        );
    }

    #[test]
    fn implication_binds_looser_than_conjunction() {
        assert_eq!(
            parse("a ^ b -> c v d").unwrap(),
            implies(and(var("a"), var("b")), or(var("c"), var("d")))
        );
    }

    #[test]
    fn mixing_and_or_requires_grouping() {
        assert_eq!(
            message("a ^ b v c"),
            "Operators 'and' and 'or' should be explicitly grouped"
        );
        assert!(parse("a v b and c").is_err());
        assert_eq!(
            parse("(a ^ b) v c").unwrap(),
            or(and(var("a"), var("b")), var("c"))
        );
    }

    #[test]
    fn negation_applies_to_next_term_only() {
        assert_eq!(parse("~a v b").unwrap(), or(not(var("a")), var("b")));
        assert_eq!(parse("not not a").unwrap(), not(not(var("a"))));
        assert_eq!(parse("~(a v b)").unwrap(), not(or(var("a"), var("b"))));
    }

    #[test]
    fn equality_does_not_chain() {
        assert_eq!(parse("x == y").unwrap(), eq(var("x"), var("y")));
        assert_eq!(parse("x =/= y").unwrap(), neq(var("x"), var("y")));
        assert!(message("a == b == c").starts_with("Unexpected token: '=='"));
    }

    #[test]
    fn equality_binds_tighter_than_conjunction() {
        assert_eq!(
            parse("x == y ^ f(x) != z").unwrap(),
            and(eq(var("x"), var("y")), neq(func("f", vec![var("x")]), var("z")))
        );
    }

    #[test]
    fn application_case_decides_function_or_predicate() {
        assert!(matches!(parse("f(x)").unwrap().kind(), NodeKind::Function));
        assert!(matches!(parse("F(x)").unwrap().kind(), NodeKind::Predicate));
        assert_eq!(
            message("gX(x)"),
            "Identifier 'gX' does not match function or predicate map"
        );
        assert!(parse("Foo(x)").is_err());
        // a lowercase head may take any term, including a capitalized variable
        assert_eq!(parse("g(X)").unwrap(), func("g", vec![var("X")]));
    }

    #[test]
    fn applications_take_comma_separated_terms() {
        assert_eq!(
            parse("P(x, f(y, z), c())").unwrap(),
            pred(
                "P",
                vec![var("x"), func("f", vec![var("y"), var("z")]), func("c", vec![])]
            )
        );
        assert_eq!(message("P(x y)"), "Expected ')', got 'y' (identifier, 4)");
    }

    #[test]
    fn quantifier_bodies_nest() {
        let node = parse("forall x. forall y. P(x, y)").unwrap();
        assert_eq!(node, forall("x", forall("y", pred("P", vec![var("x"), var("y")]))));
        let atom = node.child().unwrap().child().unwrap();
        assert_eq!(atom.children()[0].reference(), Some(&Reference::Bound(1)));
    }

    #[test]
    fn quantifier_body_extends_right() {
        assert_eq!(
            parse("exists x. P(x) ^ Q(x)").unwrap(),
            exists("x", and(pred("P", vec![var("x")]), pred("Q", vec![var("x")])))
        );
    }

    #[test]
    fn quantifier_requires_identifier_and_dot() {
        assert_eq!(message("forall . P(x)"), "Expected identifier, got '.' (symbol, 7)");
        assert_eq!(message("forall x P(x)"), "Expected '.', got 'P' (identifier, 9)");
        // quantifiers are not terms
        assert!(message("a ^ forall x. P(x)").starts_with("Expected term"));
    }

    #[test]
    fn alpha_equivalence_and_shadowing() {
        assert_eq!(parse("forall x. P(x)").unwrap(), parse("forall y. P(y)").unwrap());

        let node = parse("forall x. exists x. P(x)").unwrap();
        assert!(node.child().unwrap().is_fresh("x"));
        let atom = node.child().unwrap().child().unwrap();
        assert_eq!(atom.children()[0].reference(), Some(&Reference::Bound(0)));
    }

    #[test]
    fn reports_unbalanced_parentheses() {
        assert!(message("(a ^ b").starts_with("Expected ')', got 'EOF'"));
        assert!(message("a ^ b)").starts_with("Unexpected token: ')'"));
        assert!(message("").starts_with("Expected term, got 'EOF'"));
    }
}
