//! Abstract Syntax Tree (AST) for the Gominus programming language.
//!
//! This module defines the complete AST structure, including:
//! - Program structure
//! - Statements (declarations, control flow, classes, templates, exceptions)
//! - Expressions (literals, operators, calls, member access)
//! - Written type expressions
//!
//! Every AST node includes a `Span` for precise source location tracking.

use crate::token::Span;
use std::fmt;

pub mod expression;
pub mod statement;
pub mod types;

pub use expression::*;
pub use statement::*;
pub use types::*;

/// Root node: one Gominus compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements
    pub statements: Vec<Statement>,

    /// Span covering the whole program
    pub span: Span,
}

impl Program {
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

/// Identifier
///
/// Represents a name for a variable, function, class, package, etc.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Write a comma separated list using each item's `Display`.
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
