use std::iter::Peekable;

use logos::{Logos, Span, SpannedIter};
use thiserror::Error;

use crate::ast::{AppTerm, Query, Rule, Term, VarScope};
use crate::symbols::SymbolStore;

use super::lexer::Token;

struct TokenStream<'a> {
    source: &'a str,
    lexer: Peekable<SpannedIter<'a, Token>>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str) -> Self {
        let lexer = Token::lexer(source).spanned().peekable();
        Self { source, lexer }
    }

    pub fn next(&mut self) -> Option<(Token, Span)> {
        self.lexer.next()
    }

    pub fn advance(&mut self) {
        self.lexer.next();
    }

    pub fn peek_token(&mut self) -> Option<Token> {
        self.lexer.peek().map(|(tok, _)| tok).cloned()
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.source[span]
    }

    pub fn eof(&self) -> Span {
        self.source.len()..self.source.len()
    }
}

/// A syntax error, with the byte range of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span:?}")]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(span: Span, kind: ParseErrorKind) -> Self {
        Self { span, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected token")]
    UnexpectedToken,
}

/// Recursive-descent parser for the rule language.
///
/// Functor names are interned into the given [`SymbolStore`] as they are
/// encountered; variable names are scoped to the clause or query being
/// parsed.
pub struct Parser<'a> {
    symbols: &'a mut SymbolStore,
}

impl<'a> Parser<'a> {
    pub fn new(symbols: &'a mut SymbolStore) -> Self {
        Self { symbols }
    }

    // //////////////////////////////// PUBLIC PARSER ////////////////////////////////

    /// Parse a query: one or more comma-separated goals terminated by `.`.
    pub fn parse_query_str(&mut self, query: &str) -> Result<Query, ParseError> {
        let mut tokens = TokenStream::new(query);
        let mut scope = VarScope::new();
        let goals = self.parse_conjunction1(&mut tokens, &mut scope)?;
        self.expect_eof(&mut tokens)?;
        Ok(Query::new(goals, Some(scope)))
    }

    /// Parse a single clause terminated by `.`.
    pub fn parse_rule_str(&mut self, rule: &str) -> Result<Rule, ParseError> {
        let mut tokens = TokenStream::new(rule);
        let result = self.parse_rule(&mut tokens)?;
        self.expect_eof(&mut tokens)?;
        Ok(result)
    }

    /// Parse a whole program: a sequence of clauses.
    pub fn parse_rules_str(&mut self, rules: &str) -> Result<Vec<Rule>, ParseError> {
        let mut tokens = TokenStream::new(rules);
        let mut result = vec![];
        while tokens.peek_token().is_some() {
            result.push(self.parse_rule(&mut tokens)?);
        }
        Ok(result)
    }

    // //////////////////////////////// PARSER INTERNALS ////////////////////////////////

    fn parse_rule(&mut self, tokens: &mut TokenStream) -> Result<Rule, ParseError> {
        let mut scope = VarScope::new();
        let head = self.parse_appterm(tokens, &mut scope)?;
        let body = match tokens.peek_token() {
            Some(Token::ImpliedBy) => {
                tokens.advance();
                self.parse_conjunction1(tokens, &mut scope)?
            }
            Some(Token::Period) => {
                tokens.advance();
                Vec::new()
            }
            Some(_) => {
                let (_, span) = tokens.next().unwrap();
                return Err(ParseError::new(span, ParseErrorKind::UnexpectedToken));
            }
            None => return Err(ParseError::new(tokens.eof(), ParseErrorKind::UnexpectedEof)),
        };
        Ok(Rule {
            head,
            body,
            scope: Some(scope),
        })
    }

    /// One or more goals separated by `,`, terminated by `.` (consumed).
    fn parse_conjunction1(
        &mut self,
        tokens: &mut TokenStream,
        scope: &mut VarScope,
    ) -> Result<Vec<Term>, ParseError> {
        let mut goals = vec![self.parse_term(tokens, scope)?];
        loop {
            match tokens.peek_token() {
                Some(Token::Comma) => {
                    tokens.advance();
                    goals.push(self.parse_term(tokens, scope)?);
                }
                Some(Token::Period) => {
                    tokens.advance();
                    break;
                }
                Some(_) => {
                    let (_, span) = tokens.next().unwrap();
                    return Err(ParseError::new(span, ParseErrorKind::UnexpectedToken));
                }
                None => {
                    return Err(ParseError::new(tokens.eof(), ParseErrorKind::UnexpectedEof))
                }
            }
        }
        Ok(goals)
    }

    fn expect_eof(&mut self, tokens: &mut TokenStream) -> Result<(), ParseError> {
        if let Some((_, span)) = tokens.next() {
            Err(ParseError::new(span, ParseErrorKind::UnexpectedToken))
        } else {
            Ok(())
        }
    }

    fn parse_term(
        &mut self,
        tokens: &mut TokenStream,
        scope: &mut VarScope,
    ) -> Result<Term, ParseError> {
        match tokens.peek_token() {
            Some(Token::Variable(name)) => {
                tokens.advance();
                Ok(Term::Var(scope.get_or_insert(&name)))
            }
            Some(Token::Cut) => {
                tokens.advance();
                Ok(Term::App(AppTerm::cut()))
            }
            _ => self.parse_appterm(tokens, scope).map(Term::App),
        }
    }

    fn parse_appterm(
        &mut self,
        tokens: &mut TokenStream,
        scope: &mut VarScope,
    ) -> Result<AppTerm, ParseError> {
        let (functor, arguments_allowed) = match tokens.next() {
            Some((Token::Symbol, span)) => (self.symbols.get_or_insert_named(tokens.slice(span)), true),
            // number and string literals are plain atoms
            Some((Token::Number, span)) | Some((Token::Str, span)) => {
                (self.symbols.get_or_insert_named(tokens.slice(span)), false)
            }
            Some((_, span)) => return Err(ParseError::new(span, ParseErrorKind::UnexpectedToken)),
            None => return Err(ParseError::new(tokens.eof(), ParseErrorKind::UnexpectedEof)),
        };
        let mut args = vec![];
        if arguments_allowed {
            if let Some(Token::LParen) = tokens.peek_token() {
                tokens.advance();
                loop {
                    args.push(self.parse_term(tokens, scope)?);
                    match tokens.peek_token() {
                        Some(Token::Comma) => {
                            tokens.advance();
                        }
                        Some(Token::RParen) => {
                            tokens.advance();
                            break;
                        }
                        Some(_) => {
                            let (_, span) = tokens.next().unwrap();
                            return Err(ParseError::new(span, ParseErrorKind::UnexpectedToken));
                        }
                        None => {
                            return Err(ParseError::new(
                                tokens.eof(),
                                ParseErrorKind::UnexpectedEof,
                            ))
                        }
                    }
                }
            }
        }
        Ok(AppTerm::new(functor, args))
    }
}

#[cfg(test)]
fn query_roundtrip_test(input: &str) {
    let mut syms = SymbolStore::new();
    let mut parser = Parser::new(&mut syms);
    let query = parser.parse_query_str(input).unwrap();

    let pretty = super::pretty::Prettifier::new(&syms);
    assert_eq!(pretty.query_to_string(&query), input);
}

#[test]
fn test_query_parsing() {
    query_roundtrip_test("grandparent(bob, $X).");
    query_roundtrip_test("grandparent(bob, $X), female($X).");
    query_roundtrip_test("add(s(s(z)), s(z), $Sum).");
    query_roundtrip_test("foo($X), !.");
}

#[cfg(test)]
fn rule_roundtrip_test(input: &str) {
    let mut syms = SymbolStore::new();
    let mut parser = Parser::new(&mut syms);
    let rule = parser.parse_rule_str(input).unwrap();

    let pretty = super::pretty::Prettifier::new(&syms);
    assert_eq!(pretty.rule_to_string(&rule), input);
}

#[test]
fn test_rule_parsing() {
    rule_roundtrip_test("is_natural(z).");
    rule_roundtrip_test("is_natural(s($P)) :- is_natural($P).");
    rule_roundtrip_test("grandparent($X, $Y) :- parent($X, $Z), parent($Z, $Y).");
    rule_roundtrip_test("first($X) :- a($X), !.");
    rule_roundtrip_test("age(alice, 42).");
    rule_roundtrip_test(r#"likes(alice, "ice cream")."#);
}

#[test]
fn variables_are_scoped_per_clause() {
    let mut syms = SymbolStore::new();
    let mut parser = Parser::new(&mut syms);
    let rules = parser
        .parse_rules_str("p($X) :- q($X). q($X) :- r($X).")
        .unwrap();
    assert_eq!(rules.len(), 2);
    // both clauses use variable index 0 for their own $X
    assert_eq!(rules[0].var_slots(), 1);
    assert_eq!(rules[1].var_slots(), 1);
}

#[test]
fn comments_are_skipped() {
    let mut syms = SymbolStore::new();
    let mut parser = Parser::new(&mut syms);
    let rules = parser
        .parse_rules_str("# a program\np(a). # trailing\np(b).")
        .unwrap();
    assert_eq!(rules.len(), 2);
}

#[test]
fn parse_error_reports_position() {
    let mut syms = SymbolStore::new();
    let mut parser = Parser::new(&mut syms);
    let err = parser.parse_rules_str("p(a)").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    let err = parser.parse_rules_str("p(a))").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
}
