//! Class, interface, template and method declarations

use super::expr::parse_expression;
use super::precedence::Precedence;
use super::stmt::{parse_block, parse_function, parse_parameter, parse_parameters, parse_return_type};
use super::types::{at_type_start, parse_type};
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::TokenKind;

/// class Name [extends Parent] [implements I, J] { members }
pub(super) fn parse_class_statement(parser: &mut Parser<'_>) -> Result<ClassStatement, ParseError> {
    let start = parser.expect(TokenKind::Class)?;
    let name = parser.expect_identifier()?;

    let extends = if parser.eat(TokenKind::Extends) {
        Some(parser.expect_identifier()?)
    } else {
        None
    };

    let mut implements = Vec::new();
    if parser.eat(TokenKind::Implements) {
        implements.push(parser.expect_identifier()?);
        while parser.eat(TokenKind::Comma) {
            implements.push(parser.expect_identifier()?);
        }
    }

    parser.expect(TokenKind::LBrace)?;
    let mut members = Vec::new();

    while !parser.check(TokenKind::RBrace) && !parser.at_eof() {
        if parser.eat(TokenKind::Semicolon) {
            continue;
        }
        members.push(parse_class_member(parser)?);
    }

    let end = parser.expect(TokenKind::RBrace)?;
    tracing::trace!(class = %name, members = members.len(), "parsed class");

    Ok(ClassStatement {
        name,
        extends,
        implements,
        members,
        span: start.span.to(&end.span),
    })
}

fn parse_class_member(parser: &mut Parser<'_>) -> Result<ClassMember, ParseError> {
    let start = parser.current_span();
    let modifiers = parse_modifiers(parser);

    match parser.current_kind() {
        TokenKind::Func => Ok(ClassMember::Method(parse_function(parser, modifiers)?)),
        TokenKind::Var | TokenKind::Const => {
            let is_const = parser.advance().kind == TokenKind::Const;
            let name = parser.expect_identifier()?;
            let ty = if at_type_start(parser) {
                Some(parse_type(parser)?)
            } else {
                None
            };

            let value = if is_const {
                parser.expect(TokenKind::Assign)?;
                Some(parse_expression(parser, Precedence::Lowest)?)
            } else if parser.eat(TokenKind::Assign) {
                Some(parse_expression(parser, Precedence::Lowest)?)
            } else {
                None
            };
            parser.eat(TokenKind::Semicolon);

            let end = value
                .as_ref()
                .map(|v| *v.span())
                .or_else(|| ty.as_ref().map(|t| *t.span()))
                .unwrap_or(name.span);

            Ok(ClassMember::Field(FieldDecl {
                name,
                ty,
                value,
                is_const,
                modifiers,
                span: start.to(&end),
            }))
        }
        _ => Err(parser.unexpected_token(&[TokenKind::Var, TokenKind::Const, TokenKind::Func, TokenKind::RBrace])),
    }
}

/// Any run of member modifiers; the last visibility keyword wins.
fn parse_modifiers(parser: &mut Parser<'_>) -> Modifiers {
    let mut modifiers = Modifiers::default();

    while parser.current_kind().is_member_modifier() {
        match parser.advance().kind {
            TokenKind::Public => modifiers.visibility = Visibility::Public,
            TokenKind::Private => modifiers.visibility = Visibility::Private,
            TokenKind::Protected => modifiers.visibility = Visibility::Protected,
            TokenKind::Virtual => modifiers.is_virtual = true,
            TokenKind::Override => modifiers.is_override = true,
            TokenKind::Static => modifiers.is_static = true,
            TokenKind::Final => modifiers.is_final = true,
            TokenKind::Abstract => modifiers.is_abstract = true,
            _ => {}
        }
    }

    modifiers
}

/// interface Name { [func] name(params) [Ret] ... }
pub(super) fn parse_interface_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Interface)?;
    let name = parser.expect_identifier()?;
    parser.expect(TokenKind::LBrace)?;

    let mut methods = Vec::new();
    while !parser.check(TokenKind::RBrace) && !parser.at_eof() {
        if parser.eat(TokenKind::Semicolon) {
            continue;
        }

        let method_start = parser.current_span();
        parser.eat(TokenKind::Func);
        let method_name = parser.expect_identifier()?;
        let params = parse_parameters(parser)?;
        let return_type = parse_return_type(parser)?;

        let end = match &return_type {
            Some(ty) => *ty.span(),
            None => method_name.span,
        };
        methods.push(InterfaceMethod {
            name: method_name,
            params,
            return_type,
            span: method_start.to(&end),
        });
    }

    let end = parser.expect(TokenKind::RBrace)?;
    Ok(Statement::Interface(InterfaceStatement {
        name,
        methods,
        span: start.span.to(&end.span),
    }))
}

/// template<T, U> func ... | template<T> class ...
pub(super) fn parse_template_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Template)?;
    parser.expect(TokenKind::Lt)?;

    let mut type_params = vec![parser.expect_identifier()?];
    while parser.eat(TokenKind::Comma) {
        type_params.push(parser.expect_identifier()?);
    }
    parser.expect_closing_angle()?;

    // Registered before the body so recursive uses parse as instantiations
    if parser.check_any(&[TokenKind::Func, TokenKind::Class]) && parser.peek().kind == TokenKind::Ident {
        let name = parser.peek().literal.clone();
        parser.register_template(name);
    }

    let body = match parser.current_kind() {
        TokenKind::Func => Statement::Function(parse_function(parser, Modifiers::default())?),
        TokenKind::Class => Statement::Class(parse_class_statement(parser)?),
        _ => return Err(parser.unexpected_token(&[TokenKind::Func, TokenKind::Class])),
    };

    Ok(Statement::Template(TemplateStatement {
        type_params,
        span: start.span.to(body.span()),
        body: Box::new(body),
    }))
}

/// func (recv [*]Type) name(params) [Ret] { body }
pub(super) fn parse_method_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let start = parser.expect(TokenKind::Func)?;
    parser.expect(TokenKind::LParen)?;
    let receiver = parse_parameter(parser)?;
    parser.expect(TokenKind::RParen)?;

    let name = parser.expect_identifier()?;
    let params = parse_parameters(parser)?;
    let return_type = parse_return_type(parser)?;
    let body = parse_block(parser)?;

    Ok(Statement::Method(MethodStatement {
        receiver,
        name,
        params,
        return_type,
        span: start.span.to(&body.span),
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Statement {
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "errors: {:?}", parser.errors());
        assert_eq!(program.statements.len(), 1);
        program.statements.into_iter().next().unwrap()
    }

    #[test]
    fn test_class_members_any_order() {
        let source = "class B extends A implements Shape, Named {
            func area() float { return 0.0 }
            private var w float
            const sides int = 4
            public virtual override func name() string { return \"b\" }
        }";
        let Statement::Class(class) = parse_one(source) else {
            panic!("expected class");
        };
        assert_eq!(class.extends.as_ref().map(|p| p.name.as_str()), Some("A"));
        assert_eq!(class.implements.len(), 2);
        assert_eq!(class.fields().count(), 2);
        let methods: Vec<_> = class.methods().collect();
        assert_eq!(methods.len(), 2);
        assert!(methods[1].modifiers.is_virtual && methods[1].modifiers.is_override);
        assert_eq!(class.fields().next().map(|f| f.modifiers.visibility), Some(Visibility::Private));
    }

    #[test]
    fn test_class_requires_brace() {
        let mut parser = Parser::new("class A var x int");
        parser.parse_program();
        assert!(parser.errors()[0].contains("expected {, got VAR"));
    }

    #[test]
    fn test_interface_with_and_without_func() {
        let Statement::Interface(iface) = parse_one("interface Shape { area() float; func name() string }") else {
            panic!("expected interface");
        };
        assert_eq!(iface.methods.len(), 2);
        assert_eq!(iface.methods[1].name.name, "name");
    }

    #[test]
    fn test_template_registers_name() {
        let mut parser = Parser::new("template<T> func id(x T) T { return x } var y = id<int>(3)");
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "errors: {:?}", parser.errors());
        assert!(parser.is_template("id"));
        let Statement::Var(var) = &program.statements[1] else {
            panic!("expected var");
        };
        let Some(Expression::Call(call)) = &var.value else {
            panic!("expected call");
        };
        assert!(matches!(call.function.as_ref(), Expression::TemplateInstance(_)));
    }

    #[test]
    fn test_method_with_pointer_receiver() {
        let Statement::Method(method) = parse_one("func (p *Point) Len() int { return 0 }") else {
            panic!("expected method");
        };
        assert_eq!(method.receiver_class(), Some("Point"));
        assert_eq!(method.name.name, "Len");
    }
}
