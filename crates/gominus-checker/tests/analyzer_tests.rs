//! Analyzer integration tests.

use gominus_checker::{analyze, analyze_with, Analysis, Level, ScopeKind, SymbolKind, Type};
use gominus_parser::parse;

fn analyze_ok(source: &str) -> Analysis {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    let analysis = analyze_with(&program, true);
    assert!(!analysis.has_errors(), "Expected no errors, got: {:?}", analysis.errors());
    analysis
}

fn analysis_errors(source: &str) -> Vec<String> {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    analyze(&program).1
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_block_shadowing_is_not_redeclaration() {
    let analysis = analyze_ok("var x = 5; { var x = true; }");

    let outer = analysis.scopes.resolve("x").unwrap();
    assert!(outer.ty.is_int());

    let block = analysis
        .scopes
        .scopes()
        .find(|s| s.kind == ScopeKind::Block)
        .expect("block scope");
    let inner = block.get("x").unwrap();
    assert!(inner.ty.is_bool(), "inner x should be bool, got {}", inner.ty);

    let notes: Vec<_> = analysis.diagnostics.iter().filter(|d| d.level() == Level::Info).collect();
    assert_eq!(notes.len(), 1);
}

#[test]
fn test_two_undefined_identifiers() {
    let errors = analysis_errors("func main() { var a = foo; var b = bar + 1 }");
    let undefined: Vec<_> = errors.iter().filter(|e| e.contains("undefined identifier")).collect();
    assert_eq!(undefined.len(), 2, "got: {:?}", errors);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_scopes_stay_addressable() {
    let analysis = analyze_ok("func f(a int) { if a > 0 { var b = a } }");
    let b = analysis.scopes.scopes().find_map(|s| s.get("b")).expect("b survives its scope");
    assert!(b.ty.is_int());
    let parent = analysis.scopes.get(b.scope_id).and_then(|s| s.parent);
    assert!(parent.is_some());
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_add_and_main() {
    let analysis = analyze_ok("func add(a int, b int) int { return a + b } func main() { var r int = add(2,3) }");
    let add = analysis.scopes.resolve("add").unwrap();
    assert_eq!(add.kind, SymbolKind::Function);
    assert_eq!(add.ty.to_string(), "func(int, int) int");
}

#[test]
fn test_fmt_program() {
    analyze_ok(
        r#"
        package main
        import "fmt"

        func main() {
            var name = "world"
            fmt.Printf("hello %s\n", name)
            for i := 0; i < 3; i++ {
                fmt.Println(i)
            }
        }
        "#,
    );
}

// ============================================================================
// Classes and interfaces
// ============================================================================

#[test]
fn test_class_hierarchy() {
    let analysis = analyze_ok(
        r#"
        interface Shape { area() float }

        class Base {
            var name string
            virtual func area() float { return 0.0 }
        }

        class Square extends Base implements Shape {
            var side float
            func constructor(side float) { this.side = side }
            override func area() float { return this.side * this.side }
        }

        func total(s Shape) float { return s.area() }

        func main() {
            var sq = new Square(2.0)
            var s Shape = sq
            var n string = sq.name
            var t float = total(sq)
        }
        "#,
    );

    let square = analysis.scopes.class_info("Square").unwrap();
    assert_eq!(square.parent.as_deref(), Some("Base"));
    assert!(square.method("area").unwrap().is_virtual);
    assert!(analysis.scopes.is_subclass("Square", "Base"));
    assert!(analysis.scopes.implements("Square", "Shape"));
}

#[test]
fn test_unknown_parent_class() {
    let errors = analysis_errors("class B extends Missing { }");
    assert_eq!(errors, vec!["line 1, col 17: undefined type: Missing"]);
}

#[test]
fn test_super_without_parent() {
    let errors = analysis_errors("class A { func f() { var s = super } }");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("super used outside a derived class"));
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_class_instantiation() {
    let analysis = analyze_ok(
        r#"
        template<T> class Box { var value T }
        func main() { var b = new Box<int>() }
        "#,
    );
    let symbol = analysis.scopes.resolve("Box").unwrap();
    assert_eq!(symbol.kind, SymbolKind::Template);
    assert!(matches!(symbol.ty, Type::Template { .. }));
}

#[test]
fn test_template_argument_count() {
    let errors = analysis_errors("template<T> func id(x T) T { return x } var n = id<int, int>(3)");
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].contains("wrong number of type arguments to id: expected 1, got 2"));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_errors_accumulate() {
    let errors = analysis_errors(
        r#"
        func f() int {
            var a int = "s"
            if 3 { }
            return true
        }
        "#,
    );
    assert_eq!(errors.len(), 3, "got: {:?}", errors);
    assert!(errors[0].starts_with("line 3, col 25: type mismatch"));
    assert!(errors[1].starts_with("line 4, col 16: condition must be bool"));
    assert!(errors[2].contains("cannot return bool from function returning int"));
}

#[test]
fn test_unknown_package_members_are_opaque() {
    let analysis = analyze_ok("import \"net/http\"\nfunc main() { http.Get(\"x\") }");
    assert!(analysis.warnings().is_empty());
}
