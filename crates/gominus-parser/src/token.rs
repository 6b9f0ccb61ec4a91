//! Token definitions for the Gominus language.
//!
//! A [`Token`] pairs a closed [`TokenKind`] with the literal source text and
//! the [`Span`] it was read from.

use std::fmt;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Illegal,
    Eof,

    // Literals
    Ident,
    Int,
    Float,
    String,
    Char,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Modulo,
    Increment,
    Decrement,

    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,

    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ModAssign,

    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LeftShift,
    RightShift,

    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,

    LogicalAnd,
    LogicalOr,

    Arrow,
    ScopeRes,

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    Dot,
    Define,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Package,
    Import,
    Func,
    Var,
    Const,
    Return,
    If,
    Else,
    For,
    While,
    Break,
    Continue,
    Struct,
    Interface,
    Map,
    Chan,
    Go,
    Defer,
    Select,
    Switch,
    Case,
    Default,
    Type,
    Fallthrough,
    Range,
    Class,
    Template,
    Throw,
    Try,
    Catch,
    Finally,
    Scope,
    Public,
    Private,
    Protected,
    New,
    Delete,
    Unsafe,
    Alloc,
    Free,
    This,
    Super,
    Null,
    True,
    False,
    Extends,
    Implements,
    Virtual,
    Override,
    Final,
    Abstract,
    Static,
    ConstExpr,
    Namespace,
    Using,
    Friend,
    Operator,
}

impl TokenKind {
    /// Check if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        (*self as u16) >= (TokenKind::Package as u16)
    }

    /// Check if this token is one of the class member modifiers.
    pub fn is_member_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Virtual
                | TokenKind::Override
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
        )
    }
}

/// Resolve an identifier to its keyword kind, or `Ident`.
pub fn lookup_ident(ident: &str) -> TokenKind {
    match ident {
        "package" => TokenKind::Package,
        "import" => TokenKind::Import,
        "func" => TokenKind::Func,
        "var" => TokenKind::Var,
        "const" => TokenKind::Const,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "map" => TokenKind::Map,
        "chan" => TokenKind::Chan,
        "go" => TokenKind::Go,
        "defer" => TokenKind::Defer,
        "select" => TokenKind::Select,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "type" => TokenKind::Type,
        "fallthrough" => TokenKind::Fallthrough,
        "range" => TokenKind::Range,
        "class" => TokenKind::Class,
        "template" => TokenKind::Template,
        "throw" => TokenKind::Throw,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "scope" => TokenKind::Scope,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "new" => TokenKind::New,
        "delete" => TokenKind::Delete,
        "unsafe" => TokenKind::Unsafe,
        "alloc" => TokenKind::Alloc,
        "free" => TokenKind::Free,
        "this" => TokenKind::This,
        "super" => TokenKind::Super,
        "nil" => TokenKind::Null,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "virtual" => TokenKind::Virtual,
        "override" => TokenKind::Override,
        "final" => TokenKind::Final,
        "abstract" => TokenKind::Abstract,
        "static" => TokenKind::Static,
        "constexpr" => TokenKind::ConstExpr,
        "namespace" => TokenKind::Namespace,
        "using" => TokenKind::Using,
        "friend" => TokenKind::Friend,
        "operator" => TokenKind::Operator,
        _ => TokenKind::Ident,
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Char => "CHAR",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Modulo => "%",
            TokenKind::Increment => "++",
            TokenKind::Decrement => "--",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::ModAssign => "%=",
            TokenKind::BitAnd => "&",
            TokenKind::BitOr => "|",
            TokenKind::BitXor => "^",
            TokenKind::BitNot => "~",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::AndAssign => "&=",
            TokenKind::OrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::LeftShiftAssign => "<<=",
            TokenKind::RightShiftAssign => ">>=",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::Arrow => "->",
            TokenKind::ScopeRes => "::",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Define => ":=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Package => "PACKAGE",
            TokenKind::Import => "IMPORT",
            TokenKind::Func => "FUNC",
            TokenKind::Var => "VAR",
            TokenKind::Const => "CONST",
            TokenKind::Return => "RETURN",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::Break => "BREAK",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Struct => "STRUCT",
            TokenKind::Interface => "INTERFACE",
            TokenKind::Map => "MAP",
            TokenKind::Chan => "CHAN",
            TokenKind::Go => "GO",
            TokenKind::Defer => "DEFER",
            TokenKind::Select => "SELECT",
            TokenKind::Switch => "SWITCH",
            TokenKind::Case => "CASE",
            TokenKind::Default => "DEFAULT",
            TokenKind::Type => "TYPE",
            TokenKind::Fallthrough => "FALLTHROUGH",
            TokenKind::Range => "RANGE",
            TokenKind::Class => "CLASS",
            TokenKind::Template => "TEMPLATE",
            TokenKind::Throw => "THROW",
            TokenKind::Try => "TRY",
            TokenKind::Catch => "CATCH",
            TokenKind::Finally => "FINALLY",
            TokenKind::Scope => "SCOPE",
            TokenKind::Public => "PUBLIC",
            TokenKind::Private => "PRIVATE",
            TokenKind::Protected => "PROTECTED",
            TokenKind::New => "NEW",
            TokenKind::Delete => "DELETE",
            TokenKind::Unsafe => "UNSAFE",
            TokenKind::Alloc => "ALLOC",
            TokenKind::Free => "FREE",
            TokenKind::This => "THIS",
            TokenKind::Super => "SUPER",
            TokenKind::Null => "NULL",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Extends => "EXTENDS",
            TokenKind::Implements => "IMPLEMENTS",
            TokenKind::Virtual => "VIRTUAL",
            TokenKind::Override => "OVERRIDE",
            TokenKind::Final => "FINAL",
            TokenKind::Abstract => "ABSTRACT",
            TokenKind::Static => "STATIC",
            TokenKind::ConstExpr => "CONSTEXPR",
            TokenKind::Namespace => "NAMESPACE",
            TokenKind::Using => "USING",
            TokenKind::Friend => "FRIEND",
            TokenKind::Operator => "OPERATOR",
        };
        f.write_str(s)
    }
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Span from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, col {}", self.line, self.column)
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text (for string and char literals, the text between delimiters)
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(lookup_ident("func"), TokenKind::Func);
        assert_eq!(lookup_ident("nil"), TokenKind::Null);
        assert_eq!(lookup_ident("template"), TokenKind::Template);
        assert_eq!(lookup_ident("funcs"), TokenKind::Ident);
    }

    #[test]
    fn test_is_keyword() {
        assert!(TokenKind::Package.is_keyword());
        assert!(TokenKind::Operator.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::RBracket.is_keyword());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TokenKind::Ident.to_string(), "IDENT");
        assert_eq!(TokenKind::Define.to_string(), ":=");
        assert_eq!(TokenKind::LeftShiftAssign.to_string(), "<<=");
        assert_eq!(TokenKind::Null.to_string(), "NULL");
    }
}
