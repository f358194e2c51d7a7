//! The lexer: source text to tokens, including INDENT and DEDENT.
//!
//! Blocks are delimited by indentation, so the lexer carries a stack of
//! indentation levels and emits synthetic `Indent`/`Dedent` tokens when the
//! leading whitespace of a line changes. A single line can close several
//! blocks at once; only the first `Dedent` is returned directly and the
//! rest are queued. Empty lines and comment-only lines produce no tokens at
//! all, and remaining open blocks are closed by synthetic dedents before
//! end of file.
//!
//! Errors are sticky: the lexer returns one `Error` token carrying the
//! offending position, stores a message, and must not be used afterwards.

use rill_util::{Source, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// Maximum depth of the indentation stack, including the outermost level.
pub const MAX_INDENT_DEPTH: usize = 64;

/// The lexer state machine.
///
/// # Example
///
/// ```
/// use rill_lex::{Lexer, TokenKind};
/// use rill_util::Source;
///
/// let source = Source::from_str("t", "x = 1\n");
/// let mut lexer = Lexer::new(&source);
/// assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
/// assert_eq!(lexer.next_token().kind, TokenKind::Equals);
/// assert_eq!(lexer.next_token().kind, TokenKind::IntLiteral);
/// assert_eq!(lexer.next_token().kind, TokenKind::Newline);
/// assert_eq!(lexer.next_token().kind, TokenKind::Eof);
/// ```
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// Start of the current token.
    token_start: usize,
    /// Stack of indentation widths; the outermost level 0 is always the
    /// first entry.
    indent_stack: Vec<usize>,
    /// Dedents still owed for the current line.
    pending_dedents: usize,
    /// True while the current line holds only whitespace and comments.
    empty_line: bool,
    /// Sticky error message.
    error: Option<&'static str>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over a normalized source.
    ///
    /// The source is guaranteed to end with a newline, which the scanning
    /// loops rely on.
    pub fn new(source: &'a Source) -> Lexer<'a> {
        debug_assert!(source.text().ends_with('\n'));
        let mut indent_stack = Vec::with_capacity(MAX_INDENT_DEPTH);
        indent_stack.push(0);
        Lexer {
            cursor: Cursor::new(source.text()),
            token_start: 0,
            indent_stack,
            pending_dedents: 0,
            empty_line: true,
            error: None,
        }
    }

    /// The sticky error message, set once an `Error` token was returned.
    pub fn error_message(&self) -> Option<&'static str> {
        self.error
    }

    /// The next token. Returns `Eof` indefinitely at end of input and must
    /// not be called again after an `Error` token.
    pub fn next_token(&mut self) -> Token {
        debug_assert!(self.error.is_none(), "lexer used after an error");
        loop {
            // Dedents owed from the current line come first.
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return self.make_token(TokenKind::Dedent);
            }

            let kind = self.scan();
            if kind == TokenKind::Newline && self.empty_line {
                // Blank or comment-only line.
                continue;
            }
            self.empty_line = kind == TokenKind::Newline;
            return self.make_token(kind);
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.token_start, self.cursor.position()))
    }

    fn error_token(&mut self, message: &'static str) -> TokenKind {
        self.error = Some(message);
        TokenKind::Error
    }

    /// Skip inline spaces and comments, and set the token start.
    ///
    /// The comment start becomes the start of the NEWLINE that follows, so
    /// a diagnostic against that NEWLINE points at the comment column
    /// instead of the end of the line:
    ///
    /// ```text
    ///     x = a * (b - 1     # comment
    ///                        ^-- 'expected closing parenthesis' lands here
    /// ```
    fn skip_whitespace(&mut self) {
        while self.cursor.current() == b' ' {
            self.cursor.advance();
        }
        self.token_start = self.cursor.position();
        if self.cursor.current() == b'#' {
            while self.cursor.current() != b'\n' {
                debug_assert!(!self.cursor.is_at_end(), "source must end with a newline");
                self.cursor.advance();
            }
        }
    }

    /// Emit INDENT or the first DEDENT for a changed indentation width,
    /// queueing further dedents.
    fn handle_indentation_change(&mut self, indent: usize) -> TokenKind {
        let last_indent = *self.indent_stack.last().expect("stack is never empty");
        if indent > last_indent {
            // New indentation level; the token covers the added spaces.
            self.token_start = self.cursor.position() - indent + last_indent;
            if self.indent_stack.len() == MAX_INDENT_DEPTH {
                return self.error_token("too many indentation levels");
            }
            self.indent_stack.push(indent);
            TokenKind::Indent
        } else {
            debug_assert!(indent < last_indent);
            debug_assert_eq!(self.pending_dedents, 0);
            self.token_start = self.cursor.position() - indent;
            while self.indent_stack.len() > 1 && indent < *self.indent_stack.last().unwrap() {
                self.pending_dedents += 1;
                self.indent_stack.pop();
            }
            if indent != *self.indent_stack.last().unwrap() {
                return self.error_token("unindent does not match any outer indentation level");
            }
            debug_assert!(self.pending_dedents > 0);
            self.pending_dedents -= 1;
            TokenKind::Dedent
        }
    }

    /// Scan the next raw token, handling line-start indentation first.
    fn scan(&mut self) -> TokenKind {
        debug_assert_eq!(self.pending_dedents, 0);
        if self.empty_line {
            let mut indent = 0;
            while self.cursor.current() == b' ' {
                self.cursor.advance();
                indent += 1;
            }
            // A blank or comment-only line never changes indentation. End
            // of input counts as line content so open blocks get closed.
            let c = self.cursor.current();
            if c != b'#'
                && c != b'\n'
                && indent != *self.indent_stack.last().unwrap()
            {
                return self.handle_indentation_change(indent);
            }
        }

        self.skip_whitespace();

        let c = self.cursor.current();
        if c.is_ascii_digit() {
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
            return TokenKind::IntLiteral;
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            while self.cursor.current().is_ascii_alphanumeric() || self.cursor.current() == b'_' {
                self.cursor.advance();
            }
            let text = self.cursor.slice_from(self.token_start);
            return keyword_from_ident(text).unwrap_or(TokenKind::Identifier);
        }

        if self.cursor.is_at_end() {
            // The cursor stays put so that EOF is returned on every
            // subsequent call.
            return TokenKind::Eof;
        }
        self.cursor.advance();
        match c {
            b'\n' => TokenKind::Newline,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'=' => {
                if self.cursor.match_byte(b'=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Equals
                }
            }
            b'!' => {
                if self.cursor.match_byte(b'=') {
                    TokenKind::Ne
                } else {
                    self.error_token("invalid syntax")
                }
            }
            b'<' => {
                if self.cursor.match_byte(b'=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.cursor.match_byte(b'=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            b'"' => {
                // TODO: decode escape sequences once the language defines
                // them; for now a string is raw bytes between the quotes.
                loop {
                    match self.cursor.current() {
                        b'"' => {
                            self.cursor.advance();
                            return TokenKind::StrLiteral;
                        }
                        b'\n' => return self.error_token("unterminated string"),
                        _ => self.cursor.advance(),
                    }
                }
            }
            _ => self.error_token("unexpected character"),
        }
    }
}
