//! Lexer for the Gominus programming language.
//!
//! Fixed tokens are recognised by a logos DFA. Delimited literals and block
//! comments are scanned by callbacks so that unterminated input simply runs to
//! the end of the file. Tokens are produced lazily, one per `next_token` call.

use crate::token::{lookup_ident, Span, Token, TokenKind};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// Converted to [`TokenKind`] as tokens are pulled.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // Identifiers and keywords are split after matching
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[token("\"", |lex| lex_delimited(lex, '"'))]
    String,

    #[token("`", |lex| lex_delimited(lex, '`'))]
    RawString,

    #[token("'", |lex| lex_delimited(lex, '\''))]
    Char,

    // Three-character operators
    #[token("<<=")]
    LeftShiftAssign,
    #[token(">>=")]
    RightShiftAssign,

    // Two-character operators
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("&&")]
    LogicalAnd,
    #[token("||")]
    LogicalOr,
    #[token("->")]
    Arrow,
    #[token("::")]
    ScopeRes,
    #[token(":=")]
    Define,

    // Single-character operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("!")]
    Bang,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Modulo,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&")]
    BitAnd,
    #[token("|")]
    BitOr,
    #[token("^")]
    BitXor,
    #[token("~")]
    BitNot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::Skip {
    // "/*" already consumed; an unterminated comment runs to EOF
    let remainder = lex.remainder();

    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        lex.bump(remainder.len());
    }

    logos::Skip
}

/// Consume a delimited literal body. A backslash takes the next character
/// verbatim; a missing closing delimiter consumes the rest of the input.
fn lex_delimited(lex: &mut logos::Lexer<LogosToken>, delim: char) -> bool {
    let remainder = lex.remainder();
    let mut escaped = false;
    let mut consumed = remainder.len();

    for (idx, ch) in remainder.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == delim {
            consumed = idx + ch.len_utf8();
            break;
        }
    }

    lex.bump(consumed);
    true
}

/// Strip the delimiters from a delimited literal slice.
fn literal_body(slice: &str, delim: char) -> &str {
    let inner = &slice[delim.len_utf8()..];
    // An escaped closing delimiter (`\"`) does not terminate the literal
    let terminated = inner.ends_with(delim) && !ends_with_escape(&inner[..inner.len() - delim.len_utf8()]);
    if terminated {
        &inner[..inner.len() - delim.len_utf8()]
    } else {
        inner
    }
}

fn ends_with_escape(body: &str) -> bool {
    body.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Lazy lexer over a source string.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, LogosToken>,
    line: u32,
    column: u32,
    last_end: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: LogosToken::lexer(source),
            line: 1,
            column: 1,
            last_end: 0,
            finished: false,
        }
    }

    /// Produce the next token. Once the input is exhausted every call returns EOF.
    pub fn next_token(&mut self) -> Token {
        let Some(result) = self.inner.next() else {
            self.advance_position(self.source.len());
            self.finished = true;
            let len = self.source.len();
            return Token::eof(Span::new(len, len, self.line, self.column));
        };

        let range = self.inner.span();
        self.advance_position(range.start);
        let span = Span::new(range.start, range.end, self.line, self.column);
        let slice = self.inner.slice();

        let token = match result {
            Ok(logos_token) => self.convert_token(logos_token, slice, span),
            Err(()) => Token::new(TokenKind::Illegal, slice, span),
        };

        self.advance_position(range.end);
        token
    }

    fn advance_position(&mut self, to: usize) {
        if to <= self.last_end {
            return;
        }
        for c in self.source[self.last_end..to].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.last_end = to;
    }

    fn convert_token(&self, logos_token: LogosToken, slice: &str, span: Span) -> Token {
        let kind = match logos_token {
            LogosToken::Ident => lookup_ident(slice),
            LogosToken::Int => TokenKind::Int,
            LogosToken::Float => TokenKind::Float,
            LogosToken::String => return Token::new(TokenKind::String, literal_body(slice, '"'), span),
            LogosToken::RawString => return Token::new(TokenKind::String, literal_body(slice, '`'), span),
            LogosToken::Char => return Token::new(TokenKind::Char, literal_body(slice, '\''), span),
            LogosToken::LeftShiftAssign => TokenKind::LeftShiftAssign,
            LogosToken::RightShiftAssign => TokenKind::RightShiftAssign,
            LogosToken::Increment => TokenKind::Increment,
            LogosToken::Decrement => TokenKind::Decrement,
            LogosToken::LtEq => TokenKind::LtEq,
            LogosToken::GtEq => TokenKind::GtEq,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::NotEq => TokenKind::NotEq,
            LogosToken::PlusAssign => TokenKind::PlusAssign,
            LogosToken::MinusAssign => TokenKind::MinusAssign,
            LogosToken::MulAssign => TokenKind::MulAssign,
            LogosToken::DivAssign => TokenKind::DivAssign,
            LogosToken::ModAssign => TokenKind::ModAssign,
            LogosToken::AndAssign => TokenKind::AndAssign,
            LogosToken::OrAssign => TokenKind::OrAssign,
            LogosToken::XorAssign => TokenKind::XorAssign,
            LogosToken::LeftShift => TokenKind::LeftShift,
            LogosToken::RightShift => TokenKind::RightShift,
            LogosToken::LogicalAnd => TokenKind::LogicalAnd,
            LogosToken::LogicalOr => TokenKind::LogicalOr,
            LogosToken::Arrow => TokenKind::Arrow,
            LogosToken::ScopeRes => TokenKind::ScopeRes,
            LogosToken::Define => TokenKind::Define,
            LogosToken::Assign => TokenKind::Assign,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Minus => TokenKind::Minus,
            LogosToken::Bang => TokenKind::Bang,
            LogosToken::Asterisk => TokenKind::Asterisk,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::Modulo => TokenKind::Modulo,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::BitAnd => TokenKind::BitAnd,
            LogosToken::BitOr => TokenKind::BitOr,
            LogosToken::BitXor => TokenKind::BitXor,
            LogosToken::BitNot => TokenKind::BitNot,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            // Skipped by logos, never yielded
            LogosToken::LineComment | LogosToken::BlockComment => TokenKind::Illegal,
        };
        Token::new(kind, slice, span)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to and including EOF.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

/// Tokenize a whole source string, EOF included.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_greedy_operators() {
        assert_eq!(
            kinds("< <= << <<= := :"),
            vec![
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::LeftShift,
                TokenKind::LeftShiftAssign,
                TokenKind::Define,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.14 7.");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].literal, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[3].kind, TokenKind::Dot);
    }

    #[test]
    fn test_string_escape_kept_verbatim() {
        let tokens = tokenize(r#""a\"b" 'c' `raw`"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, r#"a\"b"#);
        assert_eq!(tokens[1].kind, TokenKind::Char);
        assert_eq!(tokens[1].literal, "c");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].literal, "raw");
    }

    #[test]
    fn test_unterminated_string_runs_to_eof() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "abc");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(kinds("x /* never closed"), vec![TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn test_illegal_character() {
        let tokens = tokenize("a @ b");
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "@");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_line_tracking() {
        let tokens = tokenize("var x\n  // note\n  y");
        assert_eq!((tokens[0].span.line, tokens[0].span.column), (1, 1));
        assert_eq!((tokens[1].span.line, tokens[1].span.column), (1, 5));
        assert_eq!((tokens[2].span.line, tokens[2].span.column), (3, 3));
    }
}
