//! Gominus Compiler - IR generation and backend drivers
//!
//! Lowers an analyzed program to LLVM-flavoured IR text and hands that text
//! to the external optimizer and code generator.
//!
//! ```
//! use gominus_parser::parse;
//!
//! let (program, _) = parse("func add(a int, b int) int { return a + b }");
//! let (scopes, _) = gominus_checker::analyze(&program);
//! let (ir, errors) = gominus_compiler::generate_ir(&program, &scopes);
//! assert!(errors.is_empty());
//! assert!(ir.contains("define i32 @add(i32 %r0, i32 %r1)"));
//! ```

pub mod backend;
pub mod error;
pub mod ir;
pub mod lower;

pub use backend::{generate_artifact, optimize, OutputFormat, TargetArch, TargetOs, ToolPaths};
pub use error::{BackendError, IrGenError};
pub use lower::IrGenerator;

use gominus_checker::ScopeTree;
use gominus_parser::Program;

/// Generate IR text for an analyzed program.
///
/// On failure the text is empty and the diagnostics explain why.
pub fn generate_ir(program: &Program, scopes: &ScopeTree) -> (String, Vec<String>) {
    generate_ir_with(program, scopes, None)
}

/// [`generate_ir`] with source markers for `debug_file`.
pub fn generate_ir_with(program: &Program, scopes: &ScopeTree, debug_file: Option<&str>) -> (String, Vec<String>) {
    let mut generator = IrGenerator::new(scopes);
    if let Some(file) = debug_file {
        generator = generator.with_debug_info(file);
    }
    match generator.generate_program(program) {
        Ok(ir) => (ir, Vec::new()),
        Err(errors) => (
            String::new(),
            errors.iter().map(IrGenError::to_diagnostic_string).collect(),
        ),
    }
}
