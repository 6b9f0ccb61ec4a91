//! Parser for the Gominus language
//!
//! Statements are parsed by recursive descent, expressions by Pratt parsing
//! over prefix/infix rule tables (see [`expr`]). The parser pulls tokens from
//! the lexer lazily and holds exactly one token of lookahead.

pub mod error;
pub mod expr;
pub mod precedence;
pub mod recovery;
pub mod stmt;
pub mod types;

mod class;

use crate::ast::Program;
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use rustc_hash::FxHashSet;

pub use error::{ParseError, ParseErrorKind};
pub use precedence::Precedence;

/// Parser state for the Gominus programming language.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    /// Current token
    current: Token,

    /// One-token lookahead
    peek: Token,

    /// Accumulated parse errors (parsing continues after errors)
    errors: Vec<ParseError>,

    /// Names declared with `template<...>` so far; `Name<` after one of
    /// these starts a template instantiation instead of a comparison
    templates: FxHashSet<String>,
}

impl<'a> Parser<'a> {
    /// Create a new parser over source code.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            templates: FxHashSet::default(),
        }
    }

    /// Parse the entire source into a [`Program`].
    ///
    /// Always returns a (possibly partial) program; see [`Parser::errors`].
    pub fn parse_program(&mut self) -> Program {
        let start_span = self.current_span();
        let mut statements = Vec::new();

        while !self.at_eof() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }

            let before = self.current_span().start;
            match stmt::parse_statement(self) {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    tracing::debug!(error = %err, "resynchronising after parse error");
                    self.errors.push(err);
                    self.sync_to_statement_boundary();
                    // A failure on a statement keyword itself would otherwise loop
                    if self.current_span().start == before && !self.at_eof() {
                        self.advance();
                    }
                }
            }
        }

        let span = match statements.last() {
            Some(last) => start_span.to(last.span()),
            None => start_span,
        };

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        Program { statements, span }
    }

    /// Parse errors formatted as `line L, col C: message`.
    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Structured parse errors.
    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Get the current token's kind.
    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.current.span
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.peek
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let peek = std::mem::replace(&mut self.peek, next);
        std::mem::replace(&mut self.current, peek)
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: TokenKind) -> bool {
        self.current.kind == expected
    }

    /// Check if the current token matches any of the given kinds.
    pub fn check_any(&self, expected: &[TokenKind]) -> bool {
        expected.contains(&self.current.kind)
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: TokenKind) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier token.
    pub fn expect_identifier(&mut self) -> Result<crate::ast::Identifier, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(crate::ast::Identifier::new(token.literal, token.span))
    }

    /// Consume a closing `>` of a template argument list, splitting `>>`.
    pub fn expect_closing_angle(&mut self) -> Result<Token, ParseError> {
        if self.check(TokenKind::RightShift) {
            let span = self.current.span;
            self.current.kind = TokenKind::Gt;
            self.current.literal = ">".to_string();
            self.current.span = Span::new(span.start + 1, span.end, span.line, span.column + 1);
            return Ok(Token::new(TokenKind::Gt, ">", Span::new(span.start, span.start + 1, span.line, span.column)));
        }
        self.expect(TokenKind::Gt)
    }

    /// Create an "unexpected token" error at the current token.
    pub fn unexpected_token(&self, expected: &[TokenKind]) -> ParseError {
        ParseError::unexpected_token(expected.to_vec(), self.current.kind, self.current.span)
    }

    // ========================================================================
    // Template registry
    // ========================================================================

    /// Record a template name so later `Name<...>` parses as an instantiation.
    pub fn register_template(&mut self, name: impl Into<String>) {
        self.templates.insert(name.into());
    }

    /// Whether `name` was declared as a template earlier in the source.
    pub fn is_template(&self, name: &str) -> bool {
        self.templates.contains(name)
    }

    fn sync_to_statement_boundary(&mut self) {
        recovery::sync_to_statement_boundary(self)
    }
}

/// Parse source into a program and its error list.
pub fn parse(source: &str) -> (Program, Vec<String>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    let errors = parser.errors();
    (program, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_new() {
        let parser = Parser::new("var x = 42;");
        assert!(parser.check(TokenKind::Var));
        assert_eq!(parser.peek().kind, TokenKind::Ident);
    }

    #[test]
    fn test_parser_advance() {
        let mut parser = Parser::new("var x");
        let tok = parser.advance();
        assert_eq!(tok.kind, TokenKind::Var);
        assert!(parser.check(TokenKind::Ident));
        assert_eq!(parser.peek().kind, TokenKind::Eof);
    }

    #[test]
    fn test_parser_at_eof() {
        let parser = Parser::new("");
        assert!(parser.at_eof());
    }

    #[test]
    fn test_split_right_shift() {
        let mut parser = Parser::new(">> x");
        assert!(parser.expect_closing_angle().is_ok());
        assert!(parser.check(TokenKind::Gt));
        assert!(parser.expect_closing_angle().is_ok());
        assert!(parser.check(TokenKind::Ident));
    }

    #[test]
    fn test_recovery_makes_progress() {
        let (program, errors) = parse(") var a = 1; } var b = 2");
        assert_eq!(errors.len(), 2);
        assert_eq!(program.len(), 2);
    }
}
