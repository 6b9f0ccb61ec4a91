//! Diagnostic rendering
//!
//! Analyzer findings are plain `line L, col C: message` strings by default.
//! This module also renders them with source context through
//! `codespan-reporting`, or as JSON for editor integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use termcolor::{ColorChoice, NoColor, StandardStream};

use crate::error::CheckError;

/// Diagnostic level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl Level {
    fn severity(self) -> Severity {
        match self {
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
            Level::Info => Severity::Note,
        }
    }
}

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

/// A diagnostic with source context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: ErrorCode,
    level: Level,
}

impl Diagnostic {
    /// Build from an analyzer finding.
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        let span = error.span();
        let code = error_code(error);
        let mut labels = vec![Label::primary(file_id, span.start..span.end).with_message(primary_label(error))];
        let mut notes = Vec::new();

        match error {
            Redeclared { original, .. } => {
                labels.push(Label::secondary(file_id, original.start..original.end).with_message("first declared here"));
            }
            AssignToConstant { .. } => notes.push("help: declare it with var instead of const".to_string()),
            UnusedImport { .. } => notes.push("help: remove the import".to_string()),
            Shadowed { .. } => notes.push("the outer declaration is hidden for the rest of this block".to_string()),
            _ => {}
        }

        Diagnostic {
            inner: CsDiagnostic::new(error.level().severity())
                .with_message(error.to_string())
                .with_code(code.0)
                .with_labels(labels)
                .with_notes(notes),
            code,
            level: error.level(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Emit to stderr with colors.
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Render without colors.
    pub fn render(&self, files: &SimpleFiles<String, String>) -> Result<String, codespan_reporting::files::Error> {
        let mut writer = NoColor::new(Vec::new());
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON for editor integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

fn primary_label(error: &CheckError) -> &'static str {
    use CheckError::*;

    match error {
        UndefinedIdentifier { .. } => "not found in this scope",
        UndefinedType { .. } => "type not found",
        Redeclared { .. } => "duplicate declaration",
        TypeMismatch { .. } | ArgumentType { .. } | ReturnTypeMismatch { .. } => "mismatched types",
        InvalidBinaryOp { .. } | InvalidUnaryOp { .. } => "invalid operation",
        NonBoolCondition { .. } => "expected bool",
        InvalidAssignTarget { .. } | AssignToConstant { .. } => "cannot be assigned",
        NotCallable { .. } => "cannot be called",
        ArgumentCount { .. } | TypeArgumentCount { .. } => "incorrect number of arguments",
        UnknownMember { .. } | UnknownPackageMember { .. } => "member not found",
        NotIndexable { .. } | InvalidIndex { .. } => "invalid index",
        MixedElements { .. } => "element type differs",
        NotAClass { .. } | NotAnInterface { .. } | NotATemplate { .. } => "wrong kind of declaration",
        MissingInterfaceMethod { .. } => "incomplete implementation",
        ReturnOutsideFunction { .. } | BreakOutsideLoop { .. } | ContinueOutsideLoop { .. } => "not allowed here",
        ThisOutsideClass { .. } | SuperWithoutParent { .. } => "no enclosing class",
        NoValue { .. } => "has no value",
        UnusedImport { .. } => "unused import",
        Shadowed { .. } => "shadowing declaration",
    }
}

/// Stable code for each kind of finding
pub fn error_code(error: &CheckError) -> ErrorCode {
    use CheckError::*;

    match error {
        UndefinedIdentifier { .. } => ErrorCode("E2001"),
        UndefinedType { .. } => ErrorCode("E2002"),
        Redeclared { .. } => ErrorCode("E2003"),
        TypeMismatch { .. } => ErrorCode("E2004"),
        InvalidBinaryOp { .. } => ErrorCode("E2005"),
        InvalidUnaryOp { .. } => ErrorCode("E2006"),
        NonBoolCondition { .. } => ErrorCode("E2007"),
        InvalidAssignTarget { .. } => ErrorCode("E2008"),
        AssignToConstant { .. } => ErrorCode("E2009"),
        NotCallable { .. } => ErrorCode("E2010"),
        ArgumentCount { .. } => ErrorCode("E2011"),
        ArgumentType { .. } => ErrorCode("E2012"),
        UnknownMember { .. } => ErrorCode("E2013"),
        UnknownPackageMember { .. } => ErrorCode("E2014"),
        NotIndexable { .. } => ErrorCode("E2015"),
        InvalidIndex { .. } => ErrorCode("E2016"),
        MixedElements { .. } => ErrorCode("E2017"),
        NotAClass { .. } => ErrorCode("E2018"),
        NotAnInterface { .. } => ErrorCode("E2019"),
        MissingInterfaceMethod { .. } => ErrorCode("E2020"),
        ReturnTypeMismatch { .. } => ErrorCode("E2021"),
        ReturnOutsideFunction { .. } => ErrorCode("E2022"),
        BreakOutsideLoop { .. } => ErrorCode("E2023"),
        ContinueOutsideLoop { .. } => ErrorCode("E2024"),
        ThisOutsideClass { .. } => ErrorCode("E2025"),
        SuperWithoutParent { .. } => ErrorCode("E2026"),
        NotATemplate { .. } => ErrorCode("E2027"),
        TypeArgumentCount { .. } => ErrorCode("E2028"),
        NoValue { .. } => ErrorCode("E2029"),
        UnusedImport { .. } => ErrorCode("W2001"),
        Shadowed { .. } => ErrorCode("I2001"),
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub level: Level,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// 1-indexed
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: label.message.clone(),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.0.to_string(),
            level: diag.level,
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use gominus_parser::Span;

    fn undefined_x() -> CheckError {
        CheckError::UndefinedIdentifier {
            name: "x".into(),
            span: Span::new(4, 5, 1, 5),
        }
    }

    #[test]
    fn test_from_check_error() {
        let diag = Diagnostic::from_check_error(&undefined_x(), 0);
        assert_eq!(diag.inner().severity, Severity::Error);
        assert_eq!(diag.code(), ErrorCode("E2001"));
        assert_eq!(diag.inner().message, "undefined identifier: x");
    }

    #[test]
    fn test_render_plain() {
        let files = create_files("main.gom", "var x");
        let diag = Diagnostic::from_check_error(&undefined_x(), 0);
        let text = diag.render(&files).unwrap();
        assert!(text.contains("error[E2001]: undefined identifier: x"), "got: {}", text);
        assert!(text.contains("main.gom:1:5"), "got: {}", text);
    }

    #[test]
    fn test_json_output() {
        let files = create_files("main.gom", "var x");
        let diag = Diagnostic::from_check_error(&undefined_x(), 0);
        let json = diag.to_json(&files).unwrap();
        let parsed: JsonDiagnostic = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.code, "E2001");
        assert_eq!(parsed.level, Level::Error);
        assert_eq!(parsed.labels[0].start_column, 5);
        assert_eq!(parsed.labels[0].style, "primary");
    }

    #[test]
    fn test_warning_severity() {
        let err = CheckError::UnusedImport {
            path: "os".into(),
            span: Span::new(0, 4, 1, 1),
        };
        let diag = Diagnostic::from_check_error(&err, 0);
        assert_eq!(diag.inner().severity, Severity::Warning);
        assert_eq!(diag.level(), Level::Warning);
    }
}
