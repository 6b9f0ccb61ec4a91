//! Unified error taxonomy for the whole pipeline
//!
//! Every stage reports its own error type; the pipeline converts them into
//! [`CompilerError`] values so callers see one shape with an optional
//! position, file, hint and cause.

use gominus_checker::CheckError;
use gominus_compiler::{BackendError, IrGenError};
use gominus_parser::{ParseError, Span};
use std::error::Error;
use std::fmt;

/// Entries shown by [`ErrorList`]'s `Display` before truncating
const MAX_DISPLAYED: usize = 10;

/// Which stage an error comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Semantic,
    IrGen,
    CodeGen,
    Io,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::Semantic => "Semantic Error",
            ErrorKind::IrGen => "IR Generation Error",
            ErrorKind::CodeGen => "Code Generation Error",
            ErrorKind::Io => "I/O Error",
            ErrorKind::Internal => "Internal Error",
        };
        f.write_str(name)
    }
}

/// A single pipeline error
#[derive(Debug)]
pub struct CompilerError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Option<Span>,
    pub file: Option<String>,
    pub hint: Option<String>,
    pub cause: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl CompilerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            file: None,
            hint: None,
            cause: None,
        }
    }

    pub fn with_position(mut self, span: Span) -> Self {
        self.position = Some(span);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Spans from synthesized nodes carry line 0
        let position = self.position.filter(|span| span.line > 0);
        match (&self.file, position) {
            (Some(file), Some(span)) => write!(
                f,
                "{} at {}:{}:{}: {}",
                self.kind, file, span.line, span.column, self.message
            )?,
            (None, Some(span)) => write!(
                f,
                "{} at line {}, column {}: {}",
                self.kind, span.line, span.column, self.message
            )?,
            (Some(file), None) => write!(f, "{} in {}: {}", self.kind, file, self.message)?,
            (None, None) => write!(f, "{}: {}", self.kind, self.message)?,
        }

        if let Some(hint) = &self.hint {
            write!(f, "\n  Hint: {}", hint)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n  Caused by: {}", cause)?;
        }
        Ok(())
    }
}

impl Error for CompilerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

impl From<&ParseError> for CompilerError {
    fn from(error: &ParseError) -> Self {
        let mut converted = CompilerError::new(ErrorKind::Syntax, error.message.clone()).with_position(error.span);
        converted.hint = error.suggestion.clone();
        converted
    }
}

impl From<&CheckError> for CompilerError {
    fn from(error: &CheckError) -> Self {
        CompilerError::new(ErrorKind::Semantic, error.to_string()).with_position(error.span())
    }
}

impl From<IrGenError> for CompilerError {
    fn from(error: IrGenError) -> Self {
        let kind = match error {
            IrGenError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::IrGen,
        };
        let mut converted = CompilerError::new(kind, error.to_string());
        converted.position = error.span();
        converted
    }
}

impl From<BackendError> for CompilerError {
    fn from(error: BackendError) -> Self {
        let hint = match &error {
            BackendError::ToolNotFound(tool) => Some(format!("install {} or set its path under [tools]", tool)),
            _ => None,
        };
        let mut converted = CompilerError::new(ErrorKind::CodeGen, error.to_string()).with_cause(error);
        converted.hint = hint;
        converted
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(error: std::io::Error) -> Self {
        CompilerError::new(ErrorKind::Io, error.to_string()).with_cause(error)
    }
}

/// Errors collected across a compilation
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<CompilerError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: CompilerError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors of one kind, in the order they were added
    pub fn filter(&self, kind: ErrorKind) -> Vec<&CompilerError> {
        self.errors.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompilerError> {
        self.errors.iter()
    }

    /// Attach `file` to every error that has none yet
    pub fn set_file(&mut self, file: &str) {
        for error in self.errors.iter_mut().filter(|e| e.file.is_none()) {
            error.file = Some(file.to_string());
        }
    }
}

impl Extend<CompilerError> for ErrorList {
    fn extend<I: IntoIterator<Item = CompilerError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ErrorList {
    type Item = CompilerError;
    type IntoIter = std::vec::IntoIter<CompilerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().take(MAX_DISPLAYED).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        if self.errors.len() > MAX_DISPLAYED {
            write!(f, "\n... and {} more errors", self.errors.len() - MAX_DISPLAYED)?;
        }
        Ok(())
    }
}

impl Error for ErrorList {}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: u32, column: u32) -> Span {
        Span::new(0, 1, line, column)
    }

    #[test]
    fn test_display_with_position() {
        let error = CompilerError::new(ErrorKind::Syntax, "expected ;").with_position(span(3, 7));
        assert_eq!(error.to_string(), "Syntax Error at line 3, column 7: expected ;");
    }

    #[test]
    fn test_display_with_file() {
        let error = CompilerError::new(ErrorKind::Semantic, "undefined identifier: z")
            .with_position(span(1, 24))
            .with_file("main.gom");
        assert_eq!(error.to_string(), "Semantic Error at main.gom:1:24: undefined identifier: z");

        let error = CompilerError::new(ErrorKind::Io, "file not found").with_file("main.gom");
        assert_eq!(error.to_string(), "I/O Error in main.gom: file not found");
    }

    #[test]
    fn test_hint_and_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = CompilerError::new(ErrorKind::CodeGen, "tool not found: llc")
            .with_hint("install llc")
            .with_cause(cause);
        assert_eq!(
            error.to_string(),
            "Code Generation Error: tool not found: llc\n  Hint: install llc\n  Caused by: no such file"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::IrGen.to_string(), "IR Generation Error");
        assert_eq!(ErrorKind::Internal.to_string(), "Internal Error");
    }

    #[test]
    fn test_internal_ir_error_kind() {
        let error = CompilerError::from(IrGenError::Internal("no current block".to_string()));
        assert_eq!(error.kind, ErrorKind::Internal);
        assert!(error.position.is_none());
    }

    #[test]
    fn test_list_filter() {
        let mut list = ErrorList::new();
        assert!(!list.has_errors());
        list.add(CompilerError::new(ErrorKind::Syntax, "a"));
        list.add(CompilerError::new(ErrorKind::Semantic, "b"));
        list.add(CompilerError::new(ErrorKind::Syntax, "c"));
        assert!(list.has_errors());
        assert_eq!(list.len(), 3);
        let syntax: Vec<_> = list.filter(ErrorKind::Syntax).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(syntax, vec!["a", "c"]);
    }

    #[test]
    fn test_list_display_truncates() {
        let mut list = ErrorList::new();
        for i in 0..13 {
            list.add(CompilerError::new(ErrorKind::Semantic, format!("error {}", i)));
        }
        let text = list.to_string();
        assert_eq!(text.lines().count(), 11, "got: {}", text);
        assert!(text.contains("error 9"));
        assert!(!text.contains("error 10"));
        assert!(text.ends_with("... and 3 more errors"), "got: {}", text);
    }
}
