//! Parser integration tests.

use gominus_parser::ast::*;
use gominus_parser::{parse, Parser};

fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    program
}

fn parse_err(source: &str) -> Vec<String> {
    let (_, errors) = parse(source);
    assert!(!errors.is_empty(), "Expected errors for '{}'", source);
    errors
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_two_var_statements() {
    let program = parse_ok("var x = 5; var y = 10;");
    assert_eq!(program.statements.len(), 2);
    assert!(program.statements.iter().all(|s| matches!(s, Statement::Var(_))));
}

#[test]
fn test_package_and_imports() {
    let program = parse_ok("package main\nimport \"fmt\"\nimport (\n\"os\"\n\"math\"\n)");
    assert_eq!(program.statements.len(), 3);
    assert!(program.statements.iter().all(Statement::is_declaration));
}

#[test]
fn test_function_signature() {
    let program = parse_ok("func add(a int, b int) int { return a + b }");
    let Statement::Function(func) = &program.statements[0] else {
        panic!("expected function, got {:?}", program.statements[0]);
    };
    assert_eq!(func.name.name, "add");
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.return_type.as_ref().map(|t| t.to_string()), Some("int".to_string()));
    assert_eq!(program.to_string(), "func add(a int, b int) int { return (a + b); }");
}

#[test]
fn test_const_without_value_is_error() {
    let errors = parse_err("const limit int");
    assert_eq!(errors[0], "line 1, col 16: expected =, got EOF");
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_operator_precedence() {
    let program = parse_ok("2 + 3 * 4");
    assert_eq!(program.statements[0].to_string(), "(2 + (3 * 4))");
}

#[test]
fn test_logical_and_comparison_precedence() {
    let program = parse_ok("a < b && c == d || !e");
    assert_eq!(program.statements[0].to_string(), "(((a < b) && (c == d)) || (!e))");
}

#[test]
fn test_assignment_is_right_associative() {
    let program = parse_ok("a = b = 3");
    let Statement::Expression(stmt) = &program.statements[0] else {
        panic!("expected expression statement");
    };
    let Expression::Assign(outer) = &stmt.expression else {
        panic!("expected assignment, got {:?}", stmt.expression);
    };
    assert!(matches!(outer.value.as_ref(), Expression::Assign(_)));
}

#[test]
fn test_member_call_chain() {
    let program = parse_ok("fmt.Println(a[0], p->x)");
    assert_eq!(program.statements[0].to_string(), "fmt.Println((a[0]), p->x)");
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_loops_and_switch() {
    let source = "
        for i < 10 { i++ }
        for var j = 0; j < 3; j++ { continue }
        for { break }
        while ok { ok = false }
        switch x { case 1: a() default: b() }
        switch { case x > 1: a() }
    ";
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 6);
}

#[test]
fn test_try_catch_finally() {
    let program = parse_ok("try { risky() } catch (e Error) { log(e) } catch { } finally { done() }");
    let Statement::TryCatch(stmt) = &program.statements[0] else {
        panic!("expected try");
    };
    assert_eq!(stmt.catches.len(), 2);
    assert_eq!(stmt.catches[0].param.as_ref().map(|p| p.name.as_str()), Some("e"));
    assert!(stmt.finally.is_some());
}

#[test]
fn test_try_without_catch_is_error() {
    let errors = parse_err("try { risky() }");
    assert!(errors[0].contains("expected CATCH"), "got: {:?}", errors);
}

// ============================================================================
// Classes and templates
// ============================================================================

#[test]
fn test_class_hierarchy() {
    let source = "
        interface Shape { area() float }
        class Base { virtual func area() float { return 0.0 } }
        class Square extends Base implements Shape {
            var side float
            func constructor(s float) { this.side = s }
            override func area() float { return this.side * this.side }
        }
        var sq = new Square(2.0)
    ";
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 4);
    let Statement::Var(var) = &program.statements[3] else {
        panic!("expected var");
    };
    assert!(matches!(var.value, Some(Expression::New(_))));
}

#[test]
fn test_template_class_instantiation() {
    let source = "
        template<T> class Box { var value T }
        var b = new Box<int>()
        var pairs = new Box<Box<int>>()
    ";
    let program = parse_ok(source);
    let Statement::Template(template) = &program.statements[0] else {
        panic!("expected template");
    };
    assert_eq!(template.name().map(|n| n.name.as_str()), Some("Box"));
    assert_eq!(program.statements[2].to_string(), "var pairs = new Box<Box<int>>();");
}

#[test]
fn test_less_than_without_template() {
    let program = parse_ok("x := Box < 3");
    assert_eq!(program.statements[0].to_string(), "x := (Box < 3)");
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_error_format_and_recovery() {
    let mut parser = Parser::new("var = 5\nvar ok = 1");
    let program = parser.parse_program();
    let errors = parser.errors();

    assert_eq!(errors, vec!["line 1, col 5: expected IDENT, got =".to_string()]);
    assert_eq!(program.statements.len(), 1);
    assert_eq!(parser.parse_errors()[0].span.line, 1);
}

#[test]
fn test_parsing_terminates_on_garbage() {
    let (_, errors) = parse(") ] } @ @ )");
    assert!(!errors.is_empty());
}
