//! Parse error types and error reporting

use crate::token::{Span, TokenKind};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,

    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken {
        expected: Vec<TokenKind>,
        found: TokenKind,
    },

    /// Unexpected end of file
    UnexpectedEof { expected: Vec<TokenKind> },

    /// No expression can start with this token
    ExpectedExpression { found: TokenKind },

    /// Invalid number literal
    InvalidNumber { value: String },

    /// Invalid syntax
    InvalidSyntax { reason: String },
}

/// Formats as `line L, col C: message`.
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}: {}", self.span.line, self.span.column, self.message)
    }
}

impl std::error::Error for ParseError {}

fn expected_list(expected: &[TokenKind]) -> String {
    match expected {
        [single] => single.to_string(),
        many => {
            let names: Vec<String> = many.iter().map(|k| k.to_string()).collect();
            format!("one of {}", names.join(", "))
        }
    }
}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<TokenKind>, found: TokenKind, span: Span) -> Self {
        let message = format!("expected {}, got {}", expected_list(&expected), found);

        if found == TokenKind::Eof {
            return Self {
                kind: ParseErrorKind::UnexpectedEof { expected },
                span,
                message,
                suggestion: None,
            };
        }

        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an error for a token that cannot start an expression.
    pub fn expected_expression(found: TokenKind, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::ExpectedExpression { found },
            span,
            message: format!("expected expression, got {}", found),
            suggestion: None,
        }
    }

    /// Create an "invalid number" error.
    pub fn invalid_number(value: impl Into<String>, span: Span) -> Self {
        let value = value.into();
        Self {
            message: format!("could not parse {} as a number", value),
            kind: ParseErrorKind::InvalidNumber { value },
            span,
            suggestion: None,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: reason.clone(),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
            suggestion: None,
        }
    }

    /// Add a suggestion to this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_format() {
        let err = ParseError::unexpected_token(vec![TokenKind::Ident], TokenKind::Assign, Span::new(4, 5, 1, 5));
        assert_eq!(err.to_string(), "line 1, col 5: expected IDENT, got =");
    }

    #[test]
    fn test_unexpected_eof_kind() {
        let err = ParseError::unexpected_token(vec![TokenKind::RBrace], TokenKind::Eof, Span::new(9, 9, 2, 1));
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
        assert_eq!(err.to_string(), "line 2, col 1: expected }, got EOF");
    }

    #[test]
    fn test_multiple_expected() {
        let err = ParseError::unexpected_token(
            vec![TokenKind::Func, TokenKind::Class],
            TokenKind::Var,
            Span::new(0, 3, 1, 1),
        );
        assert!(err.message.contains("one of FUNC, CLASS"));
    }

    #[test]
    fn test_suggestion_not_in_display() {
        let err = ParseError::invalid_syntax("bad", Span::new(0, 1, 3, 7)).with_suggestion("try this");
        assert_eq!(err.to_string(), "line 3, col 7: bad");
        assert_eq!(err.suggestion.as_deref(), Some("try this"));
    }
}
