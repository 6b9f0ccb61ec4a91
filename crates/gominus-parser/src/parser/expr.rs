//! Expression parsing
//!
//! Pratt parsing: [`prefix_rule`] maps the token that starts an expression to
//! a nullary parse function, [`infix_rule`] maps an operator token to a
//! function that extends an already parsed left operand.

use super::precedence::{get_precedence, is_right_associative, Precedence};
use super::{stmt, types, ParseError, Parser};
use crate::ast::*;
use crate::token::TokenKind;

type PrefixFn = for<'a> fn(&mut Parser<'a>) -> Result<Expression, ParseError>;
type InfixFn = for<'a> fn(&mut Parser<'a>, Expression) -> Result<Expression, ParseError>;

/// Prefix table.
fn prefix_rule(kind: TokenKind) -> Option<PrefixFn> {
    let rule: PrefixFn = match kind {
        TokenKind::Ident => parse_identifier,
        TokenKind::Int => parse_integer_literal,
        TokenKind::Float => parse_float_literal,
        TokenKind::String => parse_string_literal,
        TokenKind::Char => parse_char_literal,
        TokenKind::True | TokenKind::False => parse_boolean_literal,
        TokenKind::Null => parse_null_literal,
        TokenKind::Bang | TokenKind::Minus | TokenKind::BitNot => parse_prefix_expression,
        TokenKind::LParen => parse_grouped_expression,
        TokenKind::LBracket => parse_array_literal,
        TokenKind::LBrace => parse_hash_literal,
        TokenKind::Func => parse_function_literal,
        TokenKind::New => parse_new_expression,
        TokenKind::This => parse_this_expression,
        TokenKind::Super => parse_super_expression,
        _ => return None,
    };
    Some(rule)
}

/// Infix table.
fn infix_rule(kind: TokenKind) -> Option<InfixFn> {
    let rule: InfixFn = match kind {
        TokenKind::LParen => parse_call_expression,
        TokenKind::LBracket => parse_index_expression,
        TokenKind::Dot | TokenKind::Arrow => parse_member_expression,
        TokenKind::Increment | TokenKind::Decrement => parse_postfix_expression,
        k if is_right_associative(k) => parse_assign_expression,
        k if InfixOperator::from_token(k).is_some() => parse_infix_expression,
        _ => return None,
    };
    Some(rule)
}

/// Parse an expression, consuming infix operators that bind tighter than
/// `precedence`.
pub fn parse_expression(parser: &mut Parser<'_>, precedence: Precedence) -> Result<Expression, ParseError> {
    let kind = parser.current_kind();
    let prefix =
        prefix_rule(kind).ok_or_else(|| ParseError::expected_expression(kind, parser.current_span()))?;
    let mut left = prefix(parser)?;

    while !parser.check(TokenKind::Semicolon) && precedence < get_precedence(parser.current_kind()) {
        let Some(infix) = infix_rule(parser.current_kind()) else {
            break;
        };
        left = infix(parser, left)?;
    }

    Ok(left)
}

// ============================================================================
// Prefix rules
// ============================================================================

fn parse_identifier(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let ident = parser.expect_identifier()?;

    if parser.check(TokenKind::Lt) && parser.is_template(&ident.name) {
        parser.advance();
        let type_args = types::parse_type_list(parser)?;
        let end = parser.expect_closing_angle()?;
        let span = ident.span.to(&end.span);
        return Ok(Expression::TemplateInstance(TemplateInstanceExpression {
            template: ident,
            type_args,
            span,
        }));
    }

    Ok(Expression::Identifier(ident))
}

fn parse_integer_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let value = token
        .literal
        .parse::<i64>()
        .map_err(|_| ParseError::invalid_number(&token.literal, token.span))?;
    Ok(Expression::IntegerLiteral(IntegerLiteral { value, span: token.span }))
}

fn parse_float_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let value = token
        .literal
        .parse::<f64>()
        .map_err(|_| ParseError::invalid_number(&token.literal, token.span))?;
    Ok(Expression::FloatLiteral(FloatLiteral { value, span: token.span }))
}

fn parse_string_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::StringLiteral(StringLiteral {
        value: token.literal,
        span: token.span,
    }))
}

fn parse_char_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::CharLiteral(CharLiteral {
        value: token.literal,
        span: token.span,
    }))
}

fn parse_boolean_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::BooleanLiteral(BooleanLiteral {
        value: token.kind == TokenKind::True,
        span: token.span,
    }))
}

fn parse_null_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::NullLiteral(token.span))
}

fn parse_prefix_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let operator = PrefixOperator::from_token(token.kind)
        .ok_or_else(|| ParseError::expected_expression(token.kind, token.span))?;
    let right = parse_expression(parser, Precedence::Prefix)?;
    let span = token.span.to(right.span());

    Ok(Expression::Prefix(PrefixExpression {
        operator,
        right: Box::new(right),
        span,
    }))
}

fn parse_grouped_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    parser.expect(TokenKind::LParen)?;
    let expr = parse_expression(parser, Precedence::Lowest)?;
    parser.expect(TokenKind::RParen)?;
    Ok(expr)
}

fn parse_array_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(TokenKind::LBracket)?;
    let elements = parse_expression_list(parser, TokenKind::RBracket)?;
    let end = parser.expect(TokenKind::RBracket)?;

    Ok(Expression::ArrayLiteral(ArrayLiteral {
        elements,
        span: start.span.to(&end.span),
    }))
}

fn parse_hash_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(TokenKind::LBrace)?;
    let mut pairs = Vec::new();

    while !parser.check(TokenKind::RBrace) {
        let key = parse_expression(parser, Precedence::Lowest)?;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expression(parser, Precedence::Lowest)?;
        pairs.push((key, value));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    let end = parser.expect(TokenKind::RBrace)?;
    Ok(Expression::HashLiteral(HashLiteral {
        pairs,
        span: start.span.to(&end.span),
    }))
}

fn parse_function_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(TokenKind::Func)?;
    let params = stmt::parse_parameters(parser)?;
    let return_type = if parser.check(TokenKind::LBrace) {
        None
    } else {
        Some(types::parse_type(parser)?)
    };
    let body = stmt::parse_block(parser)?;
    let span = start.span.to(&body.span);

    Ok(Expression::FunctionLiteral(FunctionLiteral {
        params,
        return_type,
        body,
        span,
    }))
}

/// new Class(args) or new Template<T>(args)
fn parse_new_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let start = parser.expect(TokenKind::New)?;
    let name = parser.expect_identifier()?;

    let class = if parser.eat(TokenKind::Lt) {
        let args = types::parse_type_list(parser)?;
        let end = parser.expect_closing_angle()?;
        TypeExpr::Generic {
            span: name.span.to(&end.span),
            name,
            args,
        }
    } else {
        TypeExpr::Named(name)
    };

    parser.expect(TokenKind::LParen)?;
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;
    let end = parser.expect(TokenKind::RParen)?;

    Ok(Expression::New(NewExpression {
        class,
        arguments,
        span: start.span.to(&end.span),
    }))
}

fn parse_this_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::This(token.span))
}

fn parse_super_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    Ok(Expression::Super(token.span))
}

// ============================================================================
// Infix rules
// ============================================================================

fn parse_infix_expression(parser: &mut Parser<'_>, left: Expression) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let operator = InfixOperator::from_token(token.kind)
        .ok_or_else(|| ParseError::expected_expression(token.kind, token.span))?;
    let precedence = get_precedence(token.kind);
    let right = parse_expression(parser, precedence)?;
    let span = left.span().to(right.span());

    Ok(Expression::Infix(InfixExpression {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    }))
}

/// `=`, compound assignment and `:=`, binding right to left.
fn parse_assign_expression(parser: &mut Parser<'_>, target: Expression) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let operator = AssignOperator::from_token(token.kind)
        .ok_or_else(|| ParseError::expected_expression(token.kind, token.span))?;
    let value = parse_expression(parser, Precedence::Lowest)?;
    let span = target.span().to(value.span());

    Ok(Expression::Assign(AssignExpression {
        target: Box::new(target),
        operator,
        value: Box::new(value),
        span,
    }))
}

fn parse_postfix_expression(parser: &mut Parser<'_>, operand: Expression) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let operator = if token.kind == TokenKind::Increment {
        PostfixOperator::Increment
    } else {
        PostfixOperator::Decrement
    };
    let span = operand.span().to(&token.span);

    Ok(Expression::Postfix(PostfixExpression {
        operand: Box::new(operand),
        operator,
        span,
    }))
}

fn parse_call_expression(parser: &mut Parser<'_>, function: Expression) -> Result<Expression, ParseError> {
    parser.expect(TokenKind::LParen)?;
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;
    let end = parser.expect(TokenKind::RParen)?;
    let span = function.span().to(&end.span);

    Ok(Expression::Call(CallExpression {
        function: Box::new(function),
        arguments,
        span,
    }))
}

fn parse_index_expression(parser: &mut Parser<'_>, object: Expression) -> Result<Expression, ParseError> {
    parser.expect(TokenKind::LBracket)?;
    let index = parse_expression(parser, Precedence::Lowest)?;
    let end = parser.expect(TokenKind::RBracket)?;
    let span = object.span().to(&end.span);

    Ok(Expression::Index(IndexExpression {
        object: Box::new(object),
        index: Box::new(index),
        span,
    }))
}

fn parse_member_expression(parser: &mut Parser<'_>, object: Expression) -> Result<Expression, ParseError> {
    let arrow = parser.advance().kind == TokenKind::Arrow;
    let property = parser.expect_identifier()?;
    let span = object.span().to(&property.span);

    Ok(Expression::Member(MemberExpression {
        object: Box::new(object),
        property,
        arrow,
        span,
    }))
}

/// Comma separated expressions up to (not including) `end`.
pub fn parse_expression_list(parser: &mut Parser<'_>, end: TokenKind) -> Result<Vec<Expression>, ParseError> {
    let mut list = Vec::new();
    if parser.check(end) {
        return Ok(list);
    }

    list.push(parse_expression(parser, Precedence::Lowest)?);
    while parser.eat(TokenKind::Comma) {
        if parser.check(end) {
            break;
        }
        list.push(parse_expression(parser, Precedence::Lowest)?);
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expression {
        let mut parser = Parser::new(source);
        let result = parse_expression(&mut parser, Precedence::Lowest);
        assert!(result.is_ok(), "Failed to parse '{}': {:?}", source, result);
        result.unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expr("2 + 3 * 4").to_string(), "(2 + (3 * 4))");
        assert_eq!(expr("a * b + c").to_string(), "((a * b) + c)");
        assert_eq!(expr("-a * b").to_string(), "((-a) * b)");
        assert_eq!(expr("a + b == c && d || e").to_string(), "((((a + b) == c) && d) || e)");
        assert_eq!(expr("1 | 2 & 3").to_string(), "(1 | (2 & 3))");
    }

    #[test]
    fn test_assignment_right_associative() {
        assert_eq!(expr("a = b = c").to_string(), "a = b = c");
        match expr("a = b = c") {
            Expression::Assign(outer) => assert!(matches!(*outer.value, Expression::Assign(_))),
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_call_index_member() {
        assert_eq!(expr("add(1, 2 * 3)").to_string(), "add(1, (2 * 3))");
        assert_eq!(expr("a[1 + 1]").to_string(), "(a[(1 + 1)])");
        assert_eq!(expr("fmt.Println(x)").to_string(), "fmt.Println(x)");
        assert_eq!(expr("p->next").to_string(), "p->next");
    }

    #[test]
    fn test_postfix_and_define() {
        assert_eq!(expr("i++").to_string(), "(i++)");
        match expr("x := 1 + 2") {
            Expression::Assign(assign) => assert_eq!(assign.operator, AssignOperator::Define),
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("[1, 2, 3]").to_string(), "[1, 2, 3]");
        assert_eq!(expr("{\"a\": 1}").to_string(), "{\"a\": 1}");
        assert!(matches!(expr("nil"), Expression::NullLiteral(_)));
        assert!(matches!(expr("'c'"), Expression::CharLiteral(_)));
        assert!(matches!(expr("2.5"), Expression::FloatLiteral(_)));
    }

    #[test]
    fn test_new_expression() {
        assert_eq!(expr("new Point(1, 2)").to_string(), "new Point(1, 2)");
        assert_eq!(expr("new Stack<int>()").to_string(), "new Stack<int>()");
    }

    #[test]
    fn test_less_than_without_template() {
        assert_eq!(expr("Box < 3").to_string(), "(Box < 3)");
    }

    #[test]
    fn test_template_instance() {
        let mut parser = Parser::new("Box<int, string>");
        parser.register_template("Box");
        let result = parse_expression(&mut parser, Precedence::Lowest).unwrap();
        assert_eq!(result.to_string(), "Box<int, string>");
    }

    #[test]
    fn test_missing_prefix() {
        let mut parser = Parser::new(")");
        let err = parse_expression(&mut parser, Precedence::Lowest).unwrap_err();
        assert_eq!(err.to_string(), "line 1, col 1: expected expression, got )");
    }
}
