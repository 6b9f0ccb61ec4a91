//! Gominus - compiler pipeline facade
//!
//! Ties the stage crates together: source text is tokenized and parsed,
//! analyzed, lowered to IR text and finally handed to the external LLVM
//! tools.
//!
//! ```
//! let options = gominus::CompileOptions::default();
//! let compilation = gominus::compile("func main() { println(\"hi\") }", &options).unwrap();
//! assert!(compilation.ir.contains("define i32 @main()"));
//! ```
//!
//! The stage functions can also be driven one by one; each returns its
//! diagnostics as `line L, col C: message` strings.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CompileOptions, ConfigError, CONFIG_FILE};
pub use error::{CompilerError, ErrorKind, ErrorList};
pub use logging::init_logging;

pub use gominus_checker::analyze;
pub use gominus_compiler::{generate_ir, OutputFormat, TargetArch, TargetOs, ToolPaths};
pub use gominus_parser::{parse, Lexer, Program, Token, TokenKind};

use gominus_checker::Level;
use gominus_compiler::{backend, IrGenerator};
use gominus_parser::Parser;
use std::path::{Path, PathBuf};

/// Lazily tokenize `source`; the last token is always `Eof`.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

/// Optimize IR text with the default tool paths.
pub fn optimize(ir: &str, level: u8) -> (String, Vec<String>) {
    optimize_with(ir, level, &ToolPaths::default())
}

pub fn optimize_with(ir: &str, level: u8, tools: &ToolPaths) -> (String, Vec<String>) {
    match backend::optimize(ir, level, tools) {
        Ok(text) => (text, Vec::new()),
        Err(e) => (String::new(), vec![e.to_string()]),
    }
}

/// Build an artifact from IR text with the default tool paths.
pub fn generate_artifact(ir: &str, output: &Path, arch: TargetArch, os: TargetOs, format: OutputFormat) -> Vec<String> {
    generate_artifact_with(ir, output, arch, os, format, &ToolPaths::default())
}

pub fn generate_artifact_with(
    ir: &str,
    output: &Path,
    arch: TargetArch,
    os: TargetOs,
    format: OutputFormat,
    tools: &ToolPaths,
) -> Vec<String> {
    match backend::generate_artifact(ir, output, arch, os, format, tools) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    }
}

/// Result of a successful [`compile`]
#[derive(Debug, Clone)]
pub struct Compilation {
    /// IR after optimization
    pub ir: String,
    /// Non-fatal analysis findings
    pub warnings: Vec<String>,
    /// Path written when `output_file` was set
    pub artifact: Option<PathBuf>,
}

/// Run the whole pipeline on `source`.
///
/// Parsing and analysis always both run, so their errors are reported
/// together; lowering only starts when neither found anything.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation, ErrorList> {
    run_pipeline(source, None, options)
}

/// [`compile`] the contents of `path`; errors carry the file name.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<Compilation, ErrorList> {
    let file = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            let mut errors = ErrorList::new();
            errors.add(CompilerError::from(e).with_file(file));
            return Err(errors);
        }
    };
    run_pipeline(&source, Some(&file), options).map_err(|mut errors| {
        errors.set_file(&file);
        errors
    })
}

fn run_pipeline(source: &str, file: Option<&str>, options: &CompileOptions) -> Result<Compilation, ErrorList> {
    let mut errors = ErrorList::new();

    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    errors.extend(parser.parse_errors().iter().map(CompilerError::from));

    let analysis = gominus_checker::analyze_with(&program, options.type_inference);
    errors.extend(
        analysis
            .diagnostics
            .iter()
            .filter(|d| d.level() == Level::Error)
            .map(CompilerError::from),
    );
    let warnings = analysis.warnings();

    tracing::debug!(
        statements = program.statements.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "front end finished"
    );
    if errors.has_errors() {
        return Err(errors);
    }

    let mut generator = IrGenerator::new(&analysis.scopes);
    if options.debug_info {
        generator = generator.with_debug_info(file.unwrap_or("<input>"));
    }
    let ir = match generator.generate_program(&program) {
        Ok(ir) => ir,
        Err(ir_errors) => {
            errors.extend(ir_errors.into_iter().map(CompilerError::from));
            return Err(errors);
        }
    };

    let ir = backend::optimize(&ir, options.opt_level, &options.tools).map_err(|e| single(e.into()))?;

    let artifact = match &options.output_file {
        Some(output) => Some(
            backend::generate_artifact(
                &ir,
                output,
                options.target_arch,
                options.target_os,
                options.output_format,
                &options.tools,
            )
            .map_err(|e| single(e.into()))?,
        ),
        None => None,
    };

    Ok(Compilation { ir, warnings, artifact })
}

fn single(error: CompilerError) -> ErrorList {
    let mut errors = ErrorList::new();
    errors.add(error);
    errors
}
