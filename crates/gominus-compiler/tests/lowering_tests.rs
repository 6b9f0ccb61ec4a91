//! End-to-end lowering tests: source text in, IR text out

use gominus_compiler::{generate_ir, optimize, BackendError, ToolPaths};
use gominus_parser::parse;

fn compile(source: &str) -> String {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    let (scopes, check_errors) = gominus_checker::analyze(&program);
    assert!(check_errors.is_empty(), "check errors: {:?}", check_errors);
    let (ir, errors) = generate_ir(&program, &scopes);
    assert!(errors.is_empty(), "ir errors: {:?}", errors);
    ir
}

fn function<'a>(ir: &'a str, name: &str) -> &'a str {
    let start = ir
        .find(&format!("@{}(", name))
        .and_then(|at| ir[..at].rfind("define "))
        .unwrap_or_else(|| panic!("no function {} in: {}", name, ir));
    let end = ir[start..].find("\n}\n").map(|e| start + e).unwrap_or(ir.len());
    &ir[start..end]
}

#[test]
fn test_add_and_main() {
    let source = "func add(a int, b int) int { return a + b } func main() { var r int = add(2,3) }";
    let (program, parse_errors) = parse(source);
    assert!(parse_errors.is_empty(), "got: {:?}", parse_errors);
    let (scopes, check_errors) = gominus_checker::analyze(&program);
    assert!(check_errors.is_empty(), "got: {:?}", check_errors);

    let (ir, errors) = generate_ir(&program, &scopes);
    assert!(errors.is_empty(), "got: {:?}", errors);
    assert!(ir.contains("define i32 @add(i32 %r0, i32 %r1)"), "got: {}", ir);
    let main = function(&ir, "main");
    assert!(main.starts_with("define i32 @main()"), "got: {}", main);
    assert!(main.contains("call i32 @add(i32 2, i32 3)"), "got: {}", main);
    assert!(main.contains("ret i32 0"), "got: {}", main);
}

#[test]
fn test_vtable_override_and_new_slot() {
    let ir = compile(
        "class A {
            virtual func f() int { return 1 }
        }
        class B extends A {
            override func f() int { return 2 }
            virtual func g() int { return 3 }
        }",
    );
    assert!(ir.contains("@B_vtable = global [2 x ptr] [ptr @B_f, ptr @B_g]"), "got: {}", ir);
}

#[test]
fn test_inherited_method_keeps_parent_symbol() {
    let ir = compile(
        "class A {
            virtual func f() int { return 1 }
            func h() int { return 4 }
        }
        class B extends A { }
        func total(b B) int { return b.h() + b.f() }",
    );
    assert!(ir.contains("@B_vtable = global [1 x ptr] [ptr @A_f]"), "got: {}", ir);
    assert!(function(&ir, "total").contains("call i32 @A_h(ptr"), "got: {}", ir);
}

#[test]
fn test_template_defined_once() {
    let ir = compile(
        "template<T> func Id(x T) T { return x }
        func main() {
            a := Id<int>(1)
            b := Id<int>(2)
        }",
    );
    assert_eq!(ir.matches("define i32 @Id_int(").count(), 1, "got: {}", ir);
    assert_eq!(ir.matches("call i32 @Id_int(").count(), 2, "got: {}", ir);
}

#[test]
fn test_try_throw() {
    let ir = compile(
        "func risky(n int) int {
            try {
                if n > 10 { throw n }
            } catch (e int) {
                return -1
            } finally {
                println(\"cleanup\")
            }
            return n
        }",
    );
    let risky = function(&ir, "risky");
    assert!(risky.contains("personality ptr @__gxx_personality_v0"), "got: {}", risky);
    assert!(risky.contains("call void @__cxa_throw(ptr"), "got: {}", risky);
    assert!(risky.contains("; try.finally"), "got: {}", risky);
}

#[test]
fn test_globals_and_init() {
    let ir = compile(
        "var greeting = \"hi\"
        var count int
        println(greeting)
        func main() { count = 3 }",
    );
    assert!(ir.contains("@greeting = global ptr @.str."), "got: {}", ir);
    assert!(ir.contains("@count = global i32 0"), "got: {}", ir);
    assert!(function(&ir, "__gominus_init").contains("@printf"), "got: {}", ir);
    assert!(function(&ir, "main").contains("call void @__gominus_init()"), "got: {}", ir);
}

#[test]
fn test_unresolved_method_is_external() {
    let ir = compile("func f(s any) { s.close() }");
    assert!(ir.contains("declare i32 @s_close(...)"), "got: {}", ir);
}

#[test]
fn test_ir_errors_are_diagnostics() {
    // The checker rejects this too; the generator must still report it
    let (program, _) = parse("func f() int { return missing }");
    let (scopes, check_errors) = gominus_checker::analyze(&program);
    assert_eq!(check_errors.len(), 1, "got: {:?}", check_errors);
    let (ir, errors) = generate_ir(&program, &scopes);
    assert!(ir.is_empty());
    assert_eq!(errors.len(), 1, "got: {:?}", errors);
    assert!(errors[0].ends_with("undefined variable: missing"), "got: {:?}", errors);
    assert!(errors[0].starts_with("line 1, col "), "got: {:?}", errors);
}

#[test]
fn test_optimizer_level_zero_is_identity() {
    let ir = compile("func main() { println(1) }");
    let optimized = optimize(&ir, 0, &ToolPaths::default()).unwrap();
    assert_eq!(optimized, ir);
}

#[test]
fn test_missing_tool_is_reported() {
    let tools = ToolPaths {
        opt: "definitely-not-an-optimizer".to_string(),
        ..ToolPaths::default()
    };
    match optimize("", 1, &tools) {
        Err(BackendError::ToolNotFound(tool)) => assert_eq!(tool, "definitely-not-an-optimizer"),
        other => panic!("expected tool not found, got: {:?}", other),
    }
}
