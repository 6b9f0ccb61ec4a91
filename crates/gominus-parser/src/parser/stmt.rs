//! Statement parsing

use super::expr::parse_expression;
use super::precedence::Precedence;
use super::types::{at_type_start, parse_type};
use super::{class, ParseError, Parser};
use crate::ast::*;
use crate::token::TokenKind;

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    match parser.current_kind() {
        TokenKind::Package => parse_package_statement(parser),
        TokenKind::Import => parse_import_statement(parser),
        TokenKind::Var => {
            let stmt = parse_var_statement(parser)?;
            parser.eat(TokenKind::Semicolon);
            Ok(stmt)
        }
        TokenKind::Const => parse_const_statement(parser),
        TokenKind::Return => parse_return_statement(parser),
        TokenKind::If => parse_if_statement(parser),
        TokenKind::For => parse_for_statement(parser),
        TokenKind::While => parse_while_statement(parser),
        TokenKind::Switch => parse_switch_statement(parser),
        TokenKind::Break => {
            let token = parser.advance();
            parser.eat(TokenKind::Semicolon);
            Ok(Statement::Break(token.span))
        }
        TokenKind::Continue => {
            let token = parser.advance();
            parser.eat(TokenKind::Semicolon);
            Ok(Statement::Continue(token.span))
        }
        TokenKind::Func if parser.peek().kind == TokenKind::LParen => class::parse_method_statement(parser),
        TokenKind::Func => Ok(Statement::Function(parse_function(parser, Modifiers::default())?)),
        TokenKind::Class => Ok(Statement::Class(class::parse_class_statement(parser)?)),
        TokenKind::Interface => class::parse_interface_statement(parser),
        TokenKind::Template => class::parse_template_statement(parser),
        TokenKind::Try => parse_try_catch_statement(parser),
        TokenKind::Throw => parse_throw_statement(parser),
        TokenKind::Scope => {
            let start = parser.advance();
            let body = parse_block(parser)?;
            Ok(Statement::Scope(ScopeStatement {
                span: start.span.to(&body.span),
                body,
            }))
        }
        TokenKind::LBrace => Ok(Statement::Block(parse_block(parser)?)),
        _ => {
            let stmt = parse_expression_statement(parser)?;
            parser.eat(TokenKind::Semicolon);
            Ok(stmt)
        }
    }
}

/// Parse `{ statements }`.
///
/// A failing nested statement fails the whole block; recovery happens at
/// the top level only.
pub fn parse_block(parser: &mut Parser<'_>) -> Result<BlockStatement, ParseError> {
    let start = parser.expect(TokenKind::LBrace)?;
    let mut statements = Vec::new();

    while !parser.check(TokenKind::RBrace) && !parser.at_eof() {
        if parser.eat(TokenKind::Semicolon) {
            continue;
        }
        statements.push(parse_statement(parser)?);
    }

    let end = parser.expect(TokenKind::RBrace)?;
    Ok(BlockStatement {
        statements,
        span: start.span.to(&end.span),
    })
}

// ============================================================================
// Declarations
// ============================================================================

fn parse_package_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Package)?;
    let name = parser.expect_identifier()?;
    parser.eat(TokenKind::Semicolon);

    Ok(Statement::Package(PackageStatement {
        span: start.span.to(&name.span),
        name,
    }))
}

/// import "path" or import ( "a" "b" )
fn parse_import_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Import)?;
    let mut paths = Vec::new();

    let end = if parser.eat(TokenKind::LParen) {
        while !parser.check(TokenKind::RParen) {
            let path = parser.expect(TokenKind::String)?;
            paths.push(path.literal);
            while parser.eat(TokenKind::Comma) || parser.eat(TokenKind::Semicolon) {}
        }
        parser.expect(TokenKind::RParen)?.span
    } else {
        let path = parser.expect(TokenKind::String)?;
        paths.push(path.literal);
        path.span
    };
    parser.eat(TokenKind::Semicolon);

    Ok(Statement::Import(ImportStatement {
        paths,
        span: start.span.to(&end),
    }))
}

/// var name [Type] [= value], without the trailing semicolon.
pub fn parse_var_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Var)?;
    let name = parser.expect_identifier()?;

    let ty = if at_type_start(parser) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let value = if parser.eat(TokenKind::Assign) {
        Some(parse_expression(parser, Precedence::Lowest)?)
    } else {
        None
    };

    let end = value
        .as_ref()
        .map(|v| *v.span())
        .or_else(|| ty.as_ref().map(|t| *t.span()))
        .unwrap_or(name.span);

    Ok(Statement::Var(VarStatement {
        span: start.span.to(&end),
        name,
        ty,
        value,
    }))
}

/// const name [Type] = value
fn parse_const_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Const)?;
    let name = parser.expect_identifier()?;

    let ty = if at_type_start(parser) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::Assign)?;
    let value = parse_expression(parser, Precedence::Lowest)?;
    parser.eat(TokenKind::Semicolon);

    Ok(Statement::Const(ConstStatement {
        span: start.span.to(value.span()),
        name,
        ty,
        value,
    }))
}

/// func name(params) [ret] { body }
pub fn parse_function(parser: &mut Parser<'_>, modifiers: Modifiers) -> Result<FunctionStatement, ParseError> {
    let start = parser.expect(TokenKind::Func)?;
    let name = parser.expect_identifier()?;
    let params = parse_parameters(parser)?;
    let return_type = parse_return_type(parser)?;
    let body = parse_block(parser)?;

    Ok(FunctionStatement {
        span: start.span.to(&body.span),
        name,
        params,
        return_type,
        body,
        modifiers,
    })
}

/// ( name [Type], ... )
pub fn parse_parameters(parser: &mut Parser<'_>) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(TokenKind::LParen)?;
    let mut params = Vec::new();

    while !parser.check(TokenKind::RParen) {
        params.push(parse_parameter(parser)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::RParen)?;
    Ok(params)
}

/// name [Type]
pub fn parse_parameter(parser: &mut Parser<'_>) -> Result<Parameter, ParseError> {
    let name = parser.expect_identifier()?;
    let ty = if at_type_start(parser) {
        Some(parse_type(parser)?)
    } else {
        None
    };
    let span = match &ty {
        Some(t) => name.span.to(t.span()),
        None => name.span,
    };
    Ok(Parameter { name, ty, span })
}

/// Optional return type before a body or the end of a signature.
pub fn parse_return_type(parser: &mut Parser<'_>) -> Result<Option<TypeExpr>, ParseError> {
    if at_type_start(parser) {
        Ok(Some(parse_type(parser)?))
    } else {
        Ok(None)
    }
}

// ============================================================================
// Simple statements
// ============================================================================

fn parse_return_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Return)?;

    let value = if parser.check_any(&[TokenKind::Semicolon, TokenKind::RBrace, TokenKind::Eof]) {
        None
    } else {
        Some(parse_expression(parser, Precedence::Lowest)?)
    };
    parser.eat(TokenKind::Semicolon);

    let span = match &value {
        Some(v) => start.span.to(v.span()),
        None => start.span,
    };
    Ok(Statement::Return(ReturnStatement { value, span }))
}

fn parse_expression_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    Ok(Statement::Expression(ExpressionStatement {
        span: *expression.span(),
        expression,
    }))
}

/// A `var` declaration or expression, used by `for` clauses.
fn parse_simple_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    if parser.check(TokenKind::Var) {
        parse_var_statement(parser)
    } else {
        parse_expression_statement(parser)
    }
}

fn parse_throw_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Throw)?;
    let value = parse_expression(parser, Precedence::Lowest)?;
    parser.eat(TokenKind::Semicolon);

    Ok(Statement::Throw(ThrowStatement {
        span: start.span.to(value.span()),
        value,
    }))
}

// ============================================================================
// Control Flow Statements
// ============================================================================

/// if cond { } [else if ... | else { }]
fn parse_if_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::If)?;
    let condition = parse_expression(parser, Precedence::Lowest)?;
    let consequence = parse_block(parser)?;

    let alternative = if parser.eat(TokenKind::Else) {
        if parser.check(TokenKind::If) {
            Some(Box::new(parse_if_statement(parser)?))
        } else {
            Some(Box::new(Statement::Block(parse_block(parser)?)))
        }
    } else {
        None
    };

    let end = match &alternative {
        Some(alt) => *alt.span(),
        None => consequence.span,
    };

    Ok(Statement::If(IfStatement {
        condition,
        consequence,
        alternative,
        span: start.span.to(&end),
    }))
}

/// for { } | for cond { } | for [init]; [cond]; [post] { }
fn parse_for_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::For)?;
    let mut init = None;
    let mut condition = None;
    let mut post = None;

    if !parser.check(TokenKind::LBrace) {
        let first = if parser.check(TokenKind::Semicolon) {
            None
        } else {
            Some(parse_simple_statement(parser)?)
        };

        if parser.eat(TokenKind::Semicolon) {
            init = first.map(Box::new);
            if !parser.check(TokenKind::Semicolon) {
                condition = Some(parse_expression(parser, Precedence::Lowest)?);
            }
            parser.expect(TokenKind::Semicolon)?;
            if !parser.check(TokenKind::LBrace) {
                post = Some(Box::new(parse_simple_statement(parser)?));
            }
        } else {
            match first {
                Some(Statement::Expression(stmt)) => condition = Some(stmt.expression),
                _ => return Err(parser.unexpected_token(&[TokenKind::Semicolon])),
            }
        }
    }

    let body = parse_block(parser)?;
    Ok(Statement::For(ForStatement {
        init,
        condition,
        post,
        span: start.span.to(&body.span),
        body,
    }))
}

fn parse_while_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::While)?;
    let condition = parse_expression(parser, Precedence::Lowest)?;
    let body = parse_block(parser)?;

    Ok(Statement::While(WhileStatement {
        condition,
        span: start.span.to(&body.span),
        body,
    }))
}

/// switch [tag] { case a, b: ... default: ... }
fn parse_switch_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Switch)?;

    let tag = if parser.check(TokenKind::LBrace) {
        None
    } else {
        Some(parse_expression(parser, Precedence::Lowest)?)
    };

    parser.expect(TokenKind::LBrace)?;
    let mut cases = Vec::new();
    let mut default = None;

    while !parser.check(TokenKind::RBrace) {
        match parser.current_kind() {
            TokenKind::Case => {
                let case_start = parser.advance();
                let values = super::expr::parse_expression_list(parser, TokenKind::Colon)?;
                let colon = parser.expect(TokenKind::Colon)?;
                let body = parse_case_body(parser, colon.span)?;
                cases.push(SwitchCase {
                    span: case_start.span.to(&body.span),
                    values,
                    body,
                });
            }
            TokenKind::Default => {
                parser.advance();
                let colon = parser.expect(TokenKind::Colon)?;
                default = Some(parse_case_body(parser, colon.span)?);
            }
            _ => {
                return Err(parser.unexpected_token(&[TokenKind::Case, TokenKind::Default, TokenKind::RBrace]));
            }
        }
    }

    let end = parser.expect(TokenKind::RBrace)?;
    Ok(Statement::Switch(SwitchStatement {
        tag,
        cases,
        default,
        span: start.span.to(&end.span),
    }))
}

/// Statements up to the next case, default or closing brace.
fn parse_case_body(parser: &mut Parser<'_>, start: crate::token::Span) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();
    while !parser.check_any(&[TokenKind::Case, TokenKind::Default, TokenKind::RBrace, TokenKind::Eof]) {
        if parser.eat(TokenKind::Semicolon) {
            continue;
        }
        statements.push(parse_statement(parser)?);
    }

    let end = statements.last().map(|s| *s.span()).unwrap_or(start);
    Ok(BlockStatement {
        statements,
        span: start.to(&end),
    })
}

/// try { } catch [(name [Type])] { } ... [finally { }]
fn parse_try_catch_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Try)?;
    let body = parse_block(parser)?;

    let mut catches = Vec::new();
    while parser.check(TokenKind::Catch) {
        let catch_start = parser.advance();
        let (param, ty) = if parser.eat(TokenKind::LParen) {
            let name = parser.expect_identifier()?;
            let ty = if at_type_start(parser) {
                Some(parse_type(parser)?)
            } else {
                None
            };
            parser.expect(TokenKind::RParen)?;
            (Some(name), ty)
        } else {
            (None, None)
        };
        let catch_body = parse_block(parser)?;
        catches.push(CatchClause {
            param,
            ty,
            span: catch_start.span.to(&catch_body.span),
            body: catch_body,
        });
    }

    if catches.is_empty() {
        return Err(parser
            .unexpected_token(&[TokenKind::Catch])
            .with_suggestion("add a catch clause: try { } catch (e Error) { }"));
    }

    let finally = if parser.eat(TokenKind::Finally) {
        Some(parse_block(parser)?)
    } else {
        None
    };

    let end = match (&finally, catches.last()) {
        (Some(fin), _) => fin.span,
        (None, Some(last)) => last.span,
        (None, None) => body.span,
    };

    Ok(Statement::TryCatch(TryCatchStatement {
        body,
        catches,
        finally,
        span: start.span.to(&end),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(source: &str) -> Statement {
        let mut parser = Parser::new(source);
        let result = parse_statement(&mut parser);
        assert!(result.is_ok(), "Failed to parse '{}': {:?}", source, result);
        result.unwrap()
    }

    #[test]
    fn test_var_forms() {
        assert_eq!(stmt("var x int = 5").to_string(), "var x int = 5;");
        assert_eq!(stmt("var x = 5").to_string(), "var x = 5;");
        assert_eq!(stmt("var x []string").to_string(), "var x []string;");
    }

    #[test]
    fn test_const_requires_value() {
        let mut parser = Parser::new("const x int");
        let err = parse_statement(&mut parser).unwrap_err();
        assert_eq!(err.message, "expected =, got EOF");
    }

    #[test]
    fn test_for_forms() {
        match stmt("for i < 10 { i++ }") {
            Statement::For(f) => {
                assert!(f.init.is_none() && f.post.is_none());
                assert!(f.condition.is_some());
            }
            other => panic!("expected for, got {:?}", other),
        }
        match stmt("for var i = 0; i < 10; i++ { }") {
            Statement::For(f) => {
                assert!(matches!(f.init.as_deref(), Some(Statement::Var(_))));
                assert!(f.condition.is_some());
                assert!(matches!(f.post.as_deref(), Some(Statement::Expression(_))));
            }
            other => panic!("expected for, got {:?}", other),
        }
        match stmt("for { break }") {
            Statement::For(f) => assert!(f.condition.is_none()),
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let s = stmt("if a { } else if b { } else { }");
        match s {
            Statement::If(i) => assert!(matches!(i.alternative.as_deref(), Some(Statement::If(_)))),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_import_group() {
        match stmt("import (\"fmt\" \"os\")") {
            Statement::Import(i) => assert_eq!(i.paths, vec!["fmt", "os"]),
            other => panic!("expected import, got {:?}", other),
        }
    }

    #[test]
    fn test_try_requires_catch() {
        let mut parser = Parser::new("try { x() } finally { }");
        let err = parse_statement(&mut parser).unwrap_err();
        assert_eq!(err.message, "expected CATCH, got FINALLY");
    }

    #[test]
    fn test_switch_cases() {
        match stmt("switch x { case 1, 2: a() case 3: b() default: c() }") {
            Statement::Switch(s) => {
                assert_eq!(s.cases.len(), 2);
                assert_eq!(s.cases[0].values.len(), 2);
                assert!(s.default.is_some());
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }
}
