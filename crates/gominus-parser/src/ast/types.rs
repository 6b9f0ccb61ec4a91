//! Written type expressions
//!
//! Types as they appear in source: `int`, `[]string`, `map[string]int`,
//! `*Node`, `Stack<int>`.

use super::{write_list, Identifier};
use crate::token::Span;
use std::fmt;

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Named type: int, string, Point, T
    Named(Identifier),

    /// Array type: []T
    Array { element: Box<TypeExpr>, span: Span },

    /// Map type: map[K]V
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },

    /// Pointer type: *T (used for method receivers)
    Pointer { inner: Box<TypeExpr>, span: Span },

    /// Template instance: Stack<int>
    Generic {
        name: Identifier,
        args: Vec<TypeExpr>,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> &Span {
        match self {
            TypeExpr::Named(id) => &id.span,
            TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Generic { span, .. } => span,
        }
    }

    /// Create a named type with the given span.
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        TypeExpr::Named(Identifier::new(name, span))
    }

    /// Strip any pointer wrappers.
    pub fn base(&self) -> &TypeExpr {
        match self {
            TypeExpr::Pointer { inner, .. } => inner.base(),
            other => other,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(id) => write!(f, "{}", id),
            TypeExpr::Array { element, .. } => write!(f, "[]{}", element),
            TypeExpr::Map { key, value, .. } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Pointer { inner, .. } => write!(f, "*{}", inner),
            TypeExpr::Generic { name, args, .. } => {
                write!(f, "{}<", name)?;
                write_list(f, args)?;
                f.write_str(">")
            }
        }
    }
}
