//! Semantic errors
//!
//! Every variant carries the span it is reported at. `Display` gives the bare
//! message; [`CheckError::to_diagnostic_string`] prefixes the position.

use crate::diagnostic::Level;
use gominus_parser::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    #[error("undefined identifier: {name}")]
    UndefinedIdentifier { name: String, span: Span },

    #[error("undefined type: {name}")]
    UndefinedType { name: String, span: Span },

    #[error("{name} redeclared in this scope")]
    Redeclared { name: String, original: Span, span: Span },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("invalid operation: {left} {op} {right}")]
    InvalidBinaryOp {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    #[error("invalid operation: {op}{operand}")]
    InvalidUnaryOp { op: String, operand: String, span: Span },

    #[error("condition must be bool, got {actual}")]
    NonBoolCondition { actual: String, span: Span },

    #[error("cannot assign to {target}")]
    InvalidAssignTarget { target: String, span: Span },

    #[error("cannot assign to constant {name}")]
    AssignToConstant { name: String, span: Span },

    #[error("cannot call non-function {callee} (type {ty})")]
    NotCallable { callee: String, ty: String, span: Span },

    #[error("wrong number of arguments to {callee}: expected {expected}, got {actual}")]
    ArgumentCount {
        callee: String,
        /// "2" or "at least 1"
        expected: String,
        actual: usize,
        span: Span,
    },

    #[error("argument {index} to {callee}: expected {expected}, got {actual}")]
    ArgumentType {
        callee: String,
        index: usize,
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("{ty} has no field or method {member}")]
    UnknownMember { ty: String, member: String, span: Span },

    #[error("undefined: {package}.{member}")]
    UnknownPackageMember {
        package: String,
        member: String,
        span: Span,
    },

    #[error("cannot index {ty}")]
    NotIndexable { ty: String, span: Span },

    #[error("invalid index type: expected {expected}, got {actual}")]
    InvalidIndex {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("array elements must share a type: expected {expected}, got {actual}")]
    MixedElements {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("{name} is not a class")]
    NotAClass { name: String, span: Span },

    #[error("{name} is not an interface")]
    NotAnInterface { name: String, span: Span },

    #[error("{class} does not implement {interface}: missing method {method}")]
    MissingInterfaceMethod {
        class: String,
        interface: String,
        method: String,
        span: Span,
    },

    #[error("cannot return {actual} from function returning {expected}")]
    ReturnTypeMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("return outside function")]
    ReturnOutsideFunction { span: Span },

    #[error("break outside loop or switch")]
    BreakOutsideLoop { span: Span },

    #[error("continue outside loop")]
    ContinueOutsideLoop { span: Span },

    #[error("this used outside a class")]
    ThisOutsideClass { span: Span },

    #[error("super used outside a derived class")]
    SuperWithoutParent { span: Span },

    #[error("{name} is not a template")]
    NotATemplate { name: String, span: Span },

    #[error("{expr} (no value) used as value")]
    NoValue { expr: String, span: Span },

    #[error("wrong number of type arguments to {name}: expected {expected}, got {actual}")]
    TypeArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("imported and not used: \"{path}\"")]
    UnusedImport { path: String, span: Span },

    #[error("{name} shadows a declaration in an outer scope")]
    Shadowed { name: String, span: Span },
}

impl CheckError {
    pub fn span(&self) -> Span {
        use CheckError::*;

        match self {
            UndefinedIdentifier { span, .. }
            | UndefinedType { span, .. }
            | Redeclared { span, .. }
            | TypeMismatch { span, .. }
            | InvalidBinaryOp { span, .. }
            | InvalidUnaryOp { span, .. }
            | NonBoolCondition { span, .. }
            | InvalidAssignTarget { span, .. }
            | AssignToConstant { span, .. }
            | NotCallable { span, .. }
            | ArgumentCount { span, .. }
            | ArgumentType { span, .. }
            | UnknownMember { span, .. }
            | UnknownPackageMember { span, .. }
            | NotIndexable { span, .. }
            | InvalidIndex { span, .. }
            | MixedElements { span, .. }
            | NotAClass { span, .. }
            | NotAnInterface { span, .. }
            | MissingInterfaceMethod { span, .. }
            | ReturnTypeMismatch { span, .. }
            | ReturnOutsideFunction { span }
            | BreakOutsideLoop { span }
            | ContinueOutsideLoop { span }
            | ThisOutsideClass { span }
            | SuperWithoutParent { span }
            | NotATemplate { span, .. }
            | TypeArgumentCount { span, .. }
            | NoValue { span, .. }
            | UnusedImport { span, .. }
            | Shadowed { span, .. } => *span,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            CheckError::UnusedImport { .. } => Level::Warning,
            CheckError::Shadowed { .. } => Level::Info,
            _ => Level::Error,
        }
    }

    /// `line L, col C: message`
    pub fn to_diagnostic_string(&self) -> String {
        let span = self.span();
        format!("line {}, col {}: {}", span.line, span.column, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_string() {
        let err = CheckError::UndefinedIdentifier {
            name: "x".into(),
            span: Span::new(4, 5, 2, 3),
        };
        assert_eq!(err.to_diagnostic_string(), "line 2, col 3: undefined identifier: x");
        assert_eq!(err.level(), Level::Error);
    }

    #[test]
    fn test_levels() {
        let warning = CheckError::UnusedImport {
            path: "os".into(),
            span: Span::default(),
        };
        assert_eq!(warning.level(), Level::Warning);
        assert_eq!(warning.to_string(), "imported and not used: \"os\"");
    }
}
