//! Token representation.
//!
//! A token is a kind plus a span into the source. Some tokens are
//! zero-width: end of file, dedents and the synthetic indent back to column
//! zero. The excerpt `12 + 30` contains three tokens:
//!
//! ```text
//! INT_LITERAL "12"
//! PLUS        "+"
//! INT_LITERAL "30"
//! ```

use rill_util::{Source, Span};

/// Kind of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Error,
    Newline,
    Indent,
    Dedent,
    IntLiteral,
    StrLiteral,
    Identifier,
    KwIf,
    KwElif,
    KwElse,
    KwWhile,
    KwPass,
    KwPrint,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Equals,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl TokenKind {
    /// Stable display name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Error => "ERROR",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::StrLiteral => "STRING_LITERAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::KwIf => "KW_IF",
            TokenKind::KwElif => "KW_ELIF",
            TokenKind::KwElse => "KW_ELSE",
            TokenKind::KwWhile => "KW_WHILE",
            TokenKind::KwPass => "KW_PASS",
            TokenKind::KwPrint => "KW_PRINT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Equals => "EQUALS",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Le => "LE",
            TokenKind::Gt => "GT",
            TokenKind::Ge => "GE",
        }
    }
}

/// A token in the source code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token { kind, span }
    }

    /// The lexeme of this token.
    #[inline]
    pub fn text<'a>(&self, source: &'a Source) -> &'a str {
        source.slice(self.span)
    }

    /// `KIND("lexeme")` rendering for trace logging and tests.
    pub fn display(&self, source: &Source) -> String {
        format!("{}({:?})", self.kind.name(), self.text(source))
    }
}

/// Classify an identifier as a keyword. Requires an exact match, so
/// `ifi` or `elif1` stay identifiers.
pub fn keyword_from_ident(text: &str) -> Option<TokenKind> {
    match text {
        "if" => Some(TokenKind::KwIf),
        "elif" => Some(TokenKind::KwElif),
        "else" => Some(TokenKind::KwElse),
        "while" => Some(TokenKind::KwWhile),
        "pass" => Some(TokenKind::KwPass),
        "print" => Some(TokenKind::KwPrint),
        _ => None,
    }
}
