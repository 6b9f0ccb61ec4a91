//! Error recovery strategies for the parser.
//!
//! After a top-level statement fails, tokens are discarded until parsing can
//! plausibly resume at a statement boundary.

use super::Parser;
use crate::token::TokenKind;

/// Tokens that begin a statement and stop resynchronisation.
const STATEMENT_START: &[TokenKind] = &[
    TokenKind::Package,
    TokenKind::Import,
    TokenKind::Func,
    TokenKind::Var,
    TokenKind::Const,
    TokenKind::If,
    TokenKind::For,
    TokenKind::While,
    TokenKind::Class,
    TokenKind::Return,
    TokenKind::Try,
    TokenKind::Throw,
    TokenKind::Scope,
];

/// Synchronize to the next statement boundary.
///
/// Stops before a statement-starting keyword, or just after a semicolon.
pub fn sync_to_statement_boundary(parser: &mut Parser<'_>) {
    while !parser.at_eof() {
        if parser.check(TokenKind::Semicolon) {
            parser.advance();
            return;
        }
        if parser.check_any(STATEMENT_START) {
            return;
        }
        parser.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stops_at_keyword() {
        let mut parser = Parser::new("a b c var x");
        sync_to_statement_boundary(&mut parser);
        assert!(parser.check(TokenKind::Var));
    }

    #[test]
    fn test_sync_consumes_semicolon() {
        let mut parser = Parser::new(") ) ; x");
        sync_to_statement_boundary(&mut parser);
        assert!(parser.check(TokenKind::Ident));
    }
}
