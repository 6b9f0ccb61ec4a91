//! Error types for IR generation and the backend tools

use gominus_parser::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Problems found while lowering to IR
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IrGenError {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("{class} has no field or method {member}")]
    UnknownMember { class: String, member: String, span: Span },

    #[error("{name} is not a class")]
    NotAClass { name: String, span: Span },

    #[error("{name} is not a template")]
    NotATemplate { name: String, span: Span },

    #[error("wrong number of type arguments to {name}: expected {expected}, got {actual}")]
    TypeArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("cannot call {name}")]
    NotCallable { name: String, span: Span },

    #[error("cannot assign to {target}")]
    InvalidAssignTarget { target: String, span: Span },

    #[error("{keyword} outside loop")]
    OutsideLoop { keyword: &'static str, span: Span },

    #[error("class hierarchy of {name} is cyclic")]
    CyclicClass { name: String, span: Span },

    #[error("internal error: {0}")]
    Internal(String),
}

impl IrGenError {
    pub fn span(&self) -> Option<Span> {
        use IrGenError::*;

        match self {
            UndefinedVariable { span, .. }
            | UnknownMember { span, .. }
            | NotAClass { span, .. }
            | NotATemplate { span, .. }
            | TypeArgumentCount { span, .. }
            | NotCallable { span, .. }
            | InvalidAssignTarget { span, .. }
            | OutsideLoop { span, .. }
            | CyclicClass { span, .. } => Some(*span),
            Internal(_) => None,
        }
    }

    /// `line L, col C: message`, or the bare message without a position.
    pub fn to_diagnostic_string(&self) -> String {
        match self.span() {
            Some(span) if span.line > 0 => format!("line {}, col {}: {}", span.line, span.column, self),
            _ => self.to_string(),
        }
    }
}

/// Failures of the external optimizer and code generator
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid optimization level {0}: expected 0 to 3")]
    InvalidOptLevel(u8),

    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} produced output that is not UTF-8")]
    InvalidOutput { tool: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_string() {
        let err = IrGenError::UndefinedVariable {
            name: "x".into(),
            span: Span::new(0, 1, 3, 7),
        };
        assert_eq!(err.to_diagnostic_string(), "line 3, col 7: undefined variable: x");

        let internal = IrGenError::Internal("no current function".into());
        assert_eq!(internal.to_diagnostic_string(), "internal error: no current function");
    }

    #[test]
    fn test_tool_not_found() {
        let err = BackendError::ToolNotFound("llc".into());
        assert_eq!(err.to_string(), "tool not found: llc");
    }
}
