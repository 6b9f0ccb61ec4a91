//! Operator precedence table for expression parsing.

use crate::token::TokenKind;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest = 0,
    Assign = 1,      // =, +=, :=
    LogicalOr = 2,   // ||
    LogicalAnd = 3,  // &&
    Equals = 4,      // ==, !=
    LessGreater = 5, // <, >, <=, >=
    Sum = 6,         // +, -, |, ^
    Product = 7,     // *, /, %, &, <<, >>
    Prefix = 8,      // -x, !x
    Call = 9,        // f(x), x++
    Index = 10,      // a[i]
    Member = 11,     // a.b
}

/// Get the precedence of a token in infix position.
pub fn get_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Assign
        | TokenKind::Define
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::MulAssign
        | TokenKind::DivAssign
        | TokenKind::ModAssign
        | TokenKind::AndAssign
        | TokenKind::OrAssign
        | TokenKind::XorAssign
        | TokenKind::LeftShiftAssign
        | TokenKind::RightShiftAssign => Precedence::Assign,

        TokenKind::LogicalOr => Precedence::LogicalOr,
        TokenKind::LogicalAnd => Precedence::LogicalAnd,

        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,

        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Precedence::LessGreater,

        TokenKind::Plus | TokenKind::Minus | TokenKind::BitOr | TokenKind::BitXor => Precedence::Sum,

        TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Modulo
        | TokenKind::BitAnd
        | TokenKind::LeftShift
        | TokenKind::RightShift => Precedence::Product,

        TokenKind::LParen | TokenKind::Increment | TokenKind::Decrement => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        TokenKind::Dot | TokenKind::Arrow => Precedence::Member,

        _ => Precedence::Lowest,
    }
}

/// Assignment forms bind right to left.
pub fn is_right_associative(kind: TokenKind) -> bool {
    get_precedence(kind) == Precedence::Assign
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Precedence::Assign < Precedence::LogicalOr);
        assert!(Precedence::LogicalOr < Precedence::LogicalAnd);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Call < Precedence::Member);
    }

    #[test]
    fn test_bitwise_levels() {
        assert_eq!(get_precedence(TokenKind::BitOr), Precedence::Sum);
        assert_eq!(get_precedence(TokenKind::LeftShift), Precedence::Product);
    }

    #[test]
    fn test_right_associative() {
        assert!(is_right_associative(TokenKind::Define));
        assert!(is_right_associative(TokenKind::PlusAssign));
        assert!(!is_right_associative(TokenKind::Plus));
    }
}
