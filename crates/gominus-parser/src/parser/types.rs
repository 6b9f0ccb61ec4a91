//! Type expression parsing

use super::{ParseError, Parser};
use crate::ast::TypeExpr;
use crate::token::TokenKind;

/// Tokens that can begin a written type.
pub const TYPE_START: &[TokenKind] = &[
    TokenKind::Ident,
    TokenKind::LBracket,
    TokenKind::Map,
    TokenKind::Asterisk,
];

/// Parse a type: `T`, `[]T`, `map[K]V`, `*T` or `Name<T, ...>`.
pub fn parse_type(parser: &mut Parser<'_>) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();

    match parser.current_kind() {
        TokenKind::LBracket => {
            parser.advance();
            parser.expect(TokenKind::RBracket)?;
            let element = parse_type(parser)?;
            Ok(TypeExpr::Array {
                span: start.to(element.span()),
                element: Box::new(element),
            })
        }
        TokenKind::Map => {
            parser.advance();
            parser.expect(TokenKind::LBracket)?;
            let key = parse_type(parser)?;
            parser.expect(TokenKind::RBracket)?;
            let value = parse_type(parser)?;
            Ok(TypeExpr::Map {
                span: start.to(value.span()),
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        TokenKind::Asterisk => {
            parser.advance();
            let inner = parse_type(parser)?;
            Ok(TypeExpr::Pointer {
                span: start.to(inner.span()),
                inner: Box::new(inner),
            })
        }
        TokenKind::Ident => {
            let name = parser.expect_identifier()?;
            if parser.eat(TokenKind::Lt) {
                let args = parse_type_list(parser)?;
                let end = parser.expect_closing_angle()?;
                Ok(TypeExpr::Generic {
                    span: name.span.to(&end.span),
                    name,
                    args,
                })
            } else {
                Ok(TypeExpr::Named(name))
            }
        }
        _ => Err(parser.unexpected_token(TYPE_START)),
    }
}

/// Comma separated types (at least one).
pub fn parse_type_list(parser: &mut Parser<'_>) -> Result<Vec<TypeExpr>, ParseError> {
    let mut list = vec![parse_type(parser)?];
    while parser.eat(TokenKind::Comma) {
        list.push(parse_type(parser)?);
    }
    Ok(list)
}

/// Whether the current token can begin a type.
pub fn at_type_start(parser: &Parser<'_>) -> bool {
    parser.check_any(TYPE_START)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(source: &str) -> String {
        let mut parser = Parser::new(source);
        parse_type(&mut parser).unwrap().to_string()
    }

    #[test]
    fn test_type_forms() {
        assert_eq!(ty("int"), "int");
        assert_eq!(ty("[]string"), "[]string");
        assert_eq!(ty("map[string][]int"), "map[string][]int");
        assert_eq!(ty("*Node"), "*Node");
        assert_eq!(ty("Pair<int, Stack<float>>"), "Pair<int, Stack<float>>");
    }

    #[test]
    fn test_not_a_type() {
        let mut parser = Parser::new("42");
        assert!(parse_type(&mut parser).is_err());
    }
}
