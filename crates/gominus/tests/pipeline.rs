//! Whole-pipeline tests through the facade

use gominus::{
    compile, compile_file, generate_artifact, optimize, tokenize, CompileOptions, ErrorKind, OutputFormat, TargetArch,
    TargetOs, TokenKind, ToolPaths,
};

#[test]
fn test_tokenize_is_deterministic() {
    let kinds: Vec<TokenKind> = tokenize("=+(){},;").map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Assign,
            TokenKind::Plus,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
    let columns: Vec<u32> = tokenize("=+(){},;").map(|t| t.span.column).collect();
    assert_eq!(columns, (1..=9).collect::<Vec<u32>>());
    assert_eq!(tokenize("=+(){},;").collect::<Vec<_>>(), tokenize("=+(){},;").collect::<Vec<_>>());
}

#[test]
fn test_stage_by_stage() {
    let source = "func add(a int, b int) int { return a + b } func main() { var r int = add(2,3) }";
    let (program, parse_errors) = gominus::parse(source);
    assert!(parse_errors.is_empty(), "got: {:?}", parse_errors);
    let (scopes, check_errors) = gominus::analyze(&program);
    assert!(check_errors.is_empty(), "got: {:?}", check_errors);
    let (ir, ir_errors) = gominus::generate_ir(&program, &scopes);
    assert!(ir_errors.is_empty(), "got: {:?}", ir_errors);

    let (optimized, opt_errors) = optimize(&ir, 0);
    assert!(opt_errors.is_empty());
    assert_eq!(optimized, ir);
}

#[test]
fn test_compile_collects_front_end_errors() {
    let errors = compile("var x = ; var y = a + b", &CompileOptions::default()).unwrap_err();
    assert_eq!(errors.filter(ErrorKind::Syntax).len(), 1, "got: {}", errors);
    assert_eq!(errors.filter(ErrorKind::Semantic).len(), 2, "got: {}", errors);
    let first = errors.iter().next().unwrap().to_string();
    assert!(first.starts_with("Syntax Error at line 1, column 9: "), "got: {}", first);
}

#[test]
fn test_try_without_catch_has_hint() {
    let errors = compile("func f() { try { } }", &CompileOptions::default()).unwrap_err();
    let syntax = errors.filter(ErrorKind::Syntax);
    assert!(!syntax.is_empty(), "got: {}", errors);
    assert!(syntax[0].hint.as_deref().unwrap_or("").contains("catch"), "got: {}", errors);
}

#[test]
fn test_compile_reports_ir_errors() {
    let source = "class A extends B { } class B extends A { }";
    match compile(source, &CompileOptions::default()) {
        Ok(c) => panic!("expected errors, got IR: {}", c.ir),
        Err(errors) => assert!(
            errors.iter().any(|e| e.kind == ErrorKind::Semantic || e.kind == ErrorKind::IrGen),
            "got: {}",
            errors
        ),
    }
}

#[test]
fn test_method_reads_field_by_name() {
    let source = "class C {\n var n int\n func get() int { return n }\n}\nfunc main() { c := new C()\n println(c.get()) }";
    let compilation = compile(source, &CompileOptions::default()).unwrap_or_else(|e| panic!("got: {}", e));
    assert!(compilation.ir.contains("define i32 @C_get(ptr %r0)"), "got: {}", compilation.ir);
}

#[test]
fn test_void_call_used_as_value() {
    let errors = compile("func g() { }\nfunc main() { x := g()\n println(g()) }", &CompileOptions::default()).unwrap_err();
    let semantic = errors.filter(ErrorKind::Semantic);
    assert_eq!(semantic.len(), 2, "got: {}", errors);
    assert!(
        semantic.iter().all(|e| e.to_string().ends_with("g() (no value) used as value")),
        "got: {}",
        errors
    );
}

#[test]
fn test_compile_warnings() {
    let compilation = compile("import \"os\"\nfunc main() { }", &CompileOptions::default()).unwrap();
    assert_eq!(compilation.warnings, vec!["line 1, col 1: imported and not used: \"os\""]);
    assert!(compilation.artifact.is_none());
}

#[test]
fn test_debug_info_markers() {
    let options = CompileOptions {
        debug_info: true,
        ..CompileOptions::default()
    };
    let compilation = compile("func main() {\n  println(1)\n}", &options).unwrap();
    assert!(compilation.ir.contains("; line 2, col "), "got: {}", compilation.ir);
}

#[test]
fn test_compile_file_writes_ll() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("main.gom");
    std::fs::write(&source, "func main() { println(\"hi\") }").unwrap();
    let output = dir.path().join("main.ll");

    let options = CompileOptions {
        output_file: Some(output.clone()),
        ..CompileOptions::default()
    };
    let compilation = compile_file(&source, &options).unwrap();
    assert_eq!(compilation.artifact, Some(output.clone()));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), compilation.ir);
}

#[test]
fn test_compile_file_errors_carry_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.gom");
    std::fs::write(&source, "var y = missing").unwrap();

    let errors = compile_file(&source, &CompileOptions::default()).unwrap_err();
    let text = errors.to_string();
    assert!(text.starts_with("Semantic Error at "), "got: {}", text);
    assert!(text.contains("bad.gom:1:9: undefined identifier: missing"), "got: {}", text);

    let errors = compile_file(&dir.path().join("absent.gom"), &CompileOptions::default()).unwrap_err();
    assert_eq!(errors.filter(ErrorKind::Io).len(), 1);
}

#[test]
fn test_missing_codegen_tool() {
    let dir = tempfile::tempdir().unwrap();
    let diagnostics = gominus::generate_artifact_with(
        "",
        &dir.path().join("main.o"),
        TargetArch::X86_64,
        TargetOs::Linux,
        OutputFormat::Obj,
        &ToolPaths {
            llc: "gominus-no-such-llc".to_string(),
            ..ToolPaths::default()
        },
    );
    assert_eq!(diagnostics, vec!["tool not found: gominus-no-such-llc"]);
}

#[test]
fn test_missing_optimizer_through_compile() {
    let options = CompileOptions {
        opt_level: 2,
        tools: ToolPaths {
            opt: "gominus-no-such-opt".to_string(),
            ..ToolPaths::default()
        },
        ..CompileOptions::default()
    };
    let errors = compile("func main() { }", &options).unwrap_err();
    let codegen = errors.filter(ErrorKind::CodeGen);
    assert_eq!(codegen.len(), 1);
    assert!(codegen[0].hint.is_some());
    assert!(
        codegen[0].to_string().starts_with("Code Generation Error: tool not found: gominus-no-such-opt"),
        "got: {}",
        codegen[0]
    );
}

#[test]
fn test_ll_artifact_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ll");
    let diagnostics = generate_artifact("; empty\n", &path, TargetArch::X86_64, TargetOs::Linux, OutputFormat::Ll);
    assert!(diagnostics.is_empty(), "got: {:?}", diagnostics);
    assert!(path.exists());
}
