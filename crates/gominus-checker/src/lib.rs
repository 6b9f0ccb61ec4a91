//! Gominus semantic analysis
//!
//! Builds a scope tree for a parsed [`Program`], resolves identifiers and
//! infers expression types. Findings are collected, never fatal:
//!
//! ```
//! use gominus_parser::parse;
//!
//! let (program, _) = parse("var x = 5; var y = x + z");
//! let (_scopes, errors) = gominus_checker::analyze(&program);
//! assert_eq!(errors, vec!["line 1, col 24: undefined identifier: z"]);
//! ```

pub mod analyzer;
pub mod builtins;
pub mod diagnostic;
pub mod error;
mod infer;
pub mod symbols;
pub mod types;

pub use analyzer::{Analysis, Analyzer};
pub use diagnostic::{Diagnostic, ErrorCode, Level};
pub use error::CheckError;
pub use symbols::{
    ClassInfo, FieldInfo, FunctionSignature, InterfaceInfo, MethodInfo, Scope, ScopeId, ScopeKind, ScopeTree, Symbol,
    SymbolKind, TemplateInfo,
};
pub use types::{BasicKind, Type};

use gominus_parser::Program;

/// Analyze a program with inference enabled.
///
/// Returns the scope tree and the error-level findings.
pub fn analyze(program: &Program) -> (ScopeTree, Vec<String>) {
    let analysis = analyze_with(program, true);
    let errors = analysis.errors();
    (analysis.scopes, errors)
}

/// Analyze a program, keeping every finding.
pub fn analyze_with(program: &Program, type_inference: bool) -> Analysis {
    let mut analyzer = Analyzer::new().with_type_inference(type_inference);
    analyzer.analyze(program);
    analyzer.finish()
}
