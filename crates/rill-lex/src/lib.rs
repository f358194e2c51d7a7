//! rill-lex - lexical analysis for rill source code.
//!
//! The lexer turns a normalized [`Source`](rill_util::Source) into a
//! stream of [`Token`]s on demand. Indentation is significant: block
//! structure arrives as synthetic [`TokenKind::Indent`] and
//! [`TokenKind::Dedent`] tokens, and statement boundaries as
//! [`TokenKind::Newline`]. See [`lexer`] for the protocol details.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::{Lexer, MAX_INDENT_DEPTH};
pub use token::{keyword_from_ident, Token, TokenKind};
