//! Gominus parser crate - Lexer, AST and parser for the Gominus language.
//!
//! This crate turns source text into tokens and a [`Program`] tree. Parsing
//! never stops at the first problem: errors are collected as
//! `line L, col C: message` strings next to a partial tree.
//!
//! # Example
//!
//! ```
//! use gominus_parser::parse;
//!
//! let (program, errors) = parse("var x = 5; var y = 10;");
//! assert!(errors.is_empty());
//! assert_eq!(program.statements.len(), 2);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

// Re-exports for convenience
pub use ast::Program;
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token, TokenKind};
