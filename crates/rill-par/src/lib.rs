//! rill-par - recursive-descent parser for rill source code.
//!
//! The parser drives the lexer with one token of lookahead and builds an
//! arena-allocated AST. Grammar:
//!
//! ```text
//! file        := statement* EOF
//! statement   := WHILE expr COLON block
//!              | IF expr COLON block (elif_block | else_block)?
//!              | simple NEWLINE
//! elif_block  := ELIF expr COLON block (elif_block | else_block)?
//! else_block  := ELSE COLON block
//! simple      := PRINT LPAREN expr RPAREN
//!              | PASS
//!              | expr (EQUALS expr)?
//! expr        := rel
//! rel         := add ((EQ|NE|LT|LE|GT|GE) add)?
//! add         := mul ((PLUS|MINUS) mul)*
//! mul         := postfix ((STAR|SLASH) postfix)*
//! postfix     := primary (LBRACKET expr RBRACKET)*
//! primary     := INT_LITERAL | STR_LITERAL | IDENTIFIER
//!              | LPAREN expr RPAREN
//!              | LBRACKET expr_list? RBRACKET
//! block       := NEWLINE INDENT statement+ DEDENT
//! ```
//!
//! `elif` desugars to a nested `if` in the `else` branch, and a missing
//! `else` becomes a synthesized `pass`, so every `if` node has both
//! branches.
//!
//! Errors go through the diagnostic [`Handler`]; on any mismatch the
//! failing production returns `None` and the failure propagates to
//! [`parse_file`], which then returns `None` for the whole file. No error
//! recovery is attempted. When the current token is the lexer's sticky
//! `Error` token, the lexer's own message is reported instead of the
//! parser's.

pub mod ast;

pub use ast::{dump, BinOp, Expr, ExprKind, Stmt, StmtKind};

use rill_lex::{Lexer, Token, TokenKind};
use rill_util::{Arena, Handler, Source, Span};

/// Parse a whole source file.
///
/// Returns the head of the statement chain, or `None` if any diagnostic
/// was reported. An empty program parses as a single `pass`.
pub fn parse_file<'a>(
    arena: &'a Arena,
    source: &'a Source,
    handler: &'a Handler,
) -> Option<&'a Stmt<'a>> {
    let mut lexer = Lexer::new(source);
    let current = lexer.next_token();
    let mut parser = Parser {
        arena,
        handler,
        lexer,
        current,
    };
    if parser.current.kind == TokenKind::Eof {
        return Some(Stmt::pass(arena));
    }
    let result = parser.file_statements();
    debug_assert!(result.is_none() || parser.current.kind == TokenKind::Eof);
    result
}

struct Parser<'a> {
    arena: &'a Arena,
    handler: &'a Handler,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Report an error at the current token. For the lexer's sticky error
    /// token, its message wins over the parser's.
    fn error(&self, message: &str) {
        let message = if self.current.kind == TokenKind::Error {
            self.lexer.error_message().unwrap_or(message)
        } else {
            message
        };
        self.handler.error(message, self.current.span);
    }

    /// Consume the current token and advance.
    fn consume(&mut self) -> Token {
        debug_assert!(
            self.current.kind != TokenKind::Error && self.current.kind != TokenKind::Eof
        );
        let result = self.current;
        self.current = self.lexer.next_token();
        result
    }

    /// Consume the current token if it has the expected kind, otherwise
    /// report `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.current.kind != kind {
            self.error(message);
            return false;
        }
        self.consume();
        true
    }

    /// ```text
    /// expr_list := expr (COMMA expr)* COMMA?
    /// ```
    fn expression_list(&mut self, sentinel: TokenKind) -> Option<&'a Expr<'a>> {
        let mut result: Option<&'a Expr<'a>> = None;
        let mut last: Option<&'a Expr<'a>> = None;
        loop {
            let expr = self.expression()?;
            match last {
                Some(prev) => prev.set_next(expr),
                None => result = Some(expr),
            }
            last = Some(expr);
            if self.current.kind == TokenKind::Comma {
                self.consume();
            }
            if self.current.kind == sentinel {
                return result;
            }
        }
    }

    /// ```text
    /// primary := INT_LITERAL | STR_LITERAL | IDENTIFIER
    ///          | LPAREN expr RPAREN
    ///          | LBRACKET expr_list? RBRACKET
    /// ```
    fn primary(&mut self) -> Option<&'a Expr<'a>> {
        match self.current.kind {
            TokenKind::IntLiteral => {
                let token = self.consume();
                Some(Expr::int(self.arena, token.span))
            }
            TokenKind::StrLiteral => {
                let token = self.consume();
                Some(Expr::str(self.arena, token.span))
            }
            TokenKind::Identifier => {
                let token = self.consume();
                Some(Expr::name(self.arena, token.span))
            }
            TokenKind::LParen => {
                self.consume();
                let expr = self.expression()?;
                if self.expect(TokenKind::RParen, "expected closing parenthesis") {
                    Some(expr)
                } else {
                    None
                }
            }
            TokenKind::LBracket => {
                let start = self.consume().span.start;
                if self.current.kind == TokenKind::RBracket {
                    let end = self.consume().span.end;
                    return Some(Expr::list(self.arena, Span::new(start, end), None));
                }
                let first = self.expression_list(TokenKind::RBracket)?;
                let end = self.current.span.end;
                if !self.expect(TokenKind::RBracket, "expected closing bracket") {
                    return None;
                }
                Some(Expr::list(self.arena, Span::new(start, end), Some(first)))
            }
            _ => {
                self.error("expected expression");
                None
            }
        }
    }

    /// ```text
    /// postfix := primary (LBRACKET expr RBRACKET)*
    /// ```
    fn postfix_expr(&mut self) -> Option<&'a Expr<'a>> {
        let mut expr = self.primary()?;
        while self.current.kind == TokenKind::LBracket {
            self.consume();
            let index = self.expression()?;
            let end = self.current.span.end;
            if !self.expect(TokenKind::RBracket, "expected closing bracket") {
                return None;
            }
            expr = Expr::subscript(self.arena, expr, index, end);
        }
        Some(expr)
    }

    /// ```text
    /// mul := postfix ((STAR | SLASH) postfix)*
    /// ```
    fn multiplicative_expr(&mut self) -> Option<&'a Expr<'a>> {
        let mut result = self.postfix_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => return Some(result),
            };
            self.consume();
            let right = self.postfix_expr()?;
            result = Expr::binary(self.arena, result, op, right);
        }
    }

    /// ```text
    /// add := mul ((PLUS | MINUS) mul)*
    /// ```
    fn additive_expr(&mut self) -> Option<&'a Expr<'a>> {
        let mut result = self.multiplicative_expr()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Some(result),
            };
            self.consume();
            let right = self.multiplicative_expr()?;
            result = Expr::binary(self.arena, result, op, right);
        }
    }

    /// ```text
    /// rel := add ((EQ | NE | LT | LE | GT | GE) add)?
    /// ```
    ///
    /// Non-associative: at most one comparison per expression.
    fn relational_expr(&mut self) -> Option<&'a Expr<'a>> {
        let result = self.additive_expr()?;
        let op = match self.current.kind {
            TokenKind::Eq => BinOp::Eq,
            TokenKind::Ne => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Ge => BinOp::Ge,
            _ => return Some(result),
        };
        self.consume();
        let right = self.additive_expr()?;
        Some(Expr::binary(self.arena, result, op, right))
    }

    fn expression(&mut self) -> Option<&'a Expr<'a>> {
        self.relational_expr()
    }

    /// ```text
    /// simple := PRINT LPAREN expr RPAREN
    ///         | PASS
    ///         | expr (EQUALS expr)?
    /// ```
    fn simple_statement(&mut self) -> Option<&'a Stmt<'a>> {
        if self.current.kind == TokenKind::KwPrint {
            self.consume();
            if !self.expect(TokenKind::LParen, "expected '('") {
                return None;
            }
            let expr = self.expression()?;
            if !self.expect(TokenKind::RParen, "expected ')'") {
                return None;
            }
            return Some(Stmt::print(self.arena, expr));
        }
        if self.current.kind == TokenKind::KwPass {
            self.consume();
            return Some(Stmt::pass(self.arena));
        }
        let expr = self.expression()?;
        if self.current.kind != TokenKind::Equals {
            return Some(Stmt::expr(self.arena, expr));
        }
        if !matches!(expr.kind, ExprKind::Name(_) | ExprKind::Subscript { .. }) {
            self.handler
                .error("cannot assign to expression here", expr.span());
            return None;
        }
        self.consume();
        let value = self.expression()?;
        Some(Stmt::assign(self.arena, expr, value))
    }

    /// ```text
    /// else_block := ELSE COLON block
    /// ```
    fn else_block(&mut self) -> Option<&'a Stmt<'a>> {
        debug_assert_eq!(self.current.kind, TokenKind::KwElse);
        self.consume();
        if !self.expect(TokenKind::Colon, "expected ':'") {
            return None;
        }
        self.block()
    }

    /// ```text
    /// elif_block := ELIF expr COLON block (elif_block | else_block)?
    /// ```
    ///
    /// Also parses the `if` statement itself; only the keyword differs.
    fn elif_block(&mut self) -> Option<&'a Stmt<'a>> {
        debug_assert!(
            self.current.kind == TokenKind::KwElif || self.current.kind == TokenKind::KwIf
        );
        self.consume();
        let cond = self.expression()?;
        if !self.expect(TokenKind::Colon, "expected ':'") {
            return None;
        }
        let then_body = self.block()?;
        let else_body = match self.current.kind {
            TokenKind::KwElse => self.else_block()?,
            TokenKind::KwElif => self.elif_block()?,
            _ => Stmt::pass(self.arena),
        };
        Some(Stmt::if_else(self.arena, cond, then_body, else_body))
    }

    /// ```text
    /// statement := WHILE expr COLON block
    ///            | IF expr COLON block (elif_block | else_block)?
    ///            | simple NEWLINE
    /// ```
    fn statement(&mut self) -> Option<&'a Stmt<'a>> {
        match self.current.kind {
            TokenKind::KwWhile => {
                self.consume();
                let cond = self.expression()?;
                if !self.expect(TokenKind::Colon, "expected ':'") {
                    return None;
                }
                let body = self.block()?;
                Some(Stmt::while_loop(self.arena, cond, body))
            }
            TokenKind::KwIf => self.elif_block(),
            _ => {
                let stmt = self.simple_statement()?;
                if self.expect(TokenKind::Newline, "expected end of line") {
                    Some(stmt)
                } else {
                    None
                }
            }
        }
    }

    /// ```text
    /// file := statement* EOF
    /// ```
    fn file_statements(&mut self) -> Option<&'a Stmt<'a>> {
        let mut result: Option<&'a Stmt<'a>> = None;
        let mut last: Option<&'a Stmt<'a>> = None;
        while self.current.kind != TokenKind::Eof {
            // Stray indentation between top-level statements is skipped so
            // that the diagnostic lands on the line's content, or on the
            // lexer's own indentation error, instead of on the leading
            // whitespace.
            if self.current.kind == TokenKind::Indent {
                self.consume();
                continue;
            }
            let stmt = self.statement()?;
            match last {
                Some(prev) => prev.set_next(stmt),
                None => result = Some(stmt),
            }
            last = Some(stmt);
        }
        result
    }

    /// ```text
    /// statements := statement+
    /// ```
    fn statements(&mut self, sentinel: TokenKind) -> Option<&'a Stmt<'a>> {
        let result = self.statement()?;
        let mut last = result;
        while self.current.kind != sentinel {
            let next = self.statement()?;
            last.set_next(next);
            last = next;
        }
        Some(result)
    }

    /// ```text
    /// block := NEWLINE INDENT statement+ DEDENT
    /// ```
    fn block(&mut self) -> Option<&'a Stmt<'a>> {
        if !self.expect(TokenKind::Newline, "newline expected") {
            return None;
        }
        if !self.expect(TokenKind::Indent, "indent expected") {
            return None;
        }
        let result = self.statements(TokenKind::Dedent)?;
        debug_assert_eq!(self.current.kind, TokenKind::Dedent);
        self.consume();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Arena, Source, Handler, bool) {
        let arena = Arena::new();
        let source = Source::from_str("test.rl", text);
        let handler = Handler::new();
        let ok = {
            let result = parse_file(&arena, &source, &handler);
            result.is_some()
        };
        (arena, source, handler, ok)
    }

    /// Parse and render the AST dump, asserting success.
    fn parse_dump(text: &str) -> String {
        let arena = Arena::new();
        let source = Source::from_str("test.rl", text);
        let handler = Handler::new();
        let stmt = parse_file(&arena, &source, &handler)
            .unwrap_or_else(|| panic!("parse failed: {:?}", handler.diagnostics()));
        dump(stmt, &source)
    }

    /// Parse expecting failure; returns the first diagnostic message.
    fn parse_err(text: &str) -> String {
        let (_, _, handler, ok) = parse(text);
        assert!(!ok, "expected a parse failure");
        let diags = handler.diagnostics();
        assert!(!diags.is_empty());
        diags[0].message.clone()
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse_dump(""), "pass\n");
        assert_eq!(parse_dump("# only a comment\n"), "pass\n");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_dump("1 + 2 * 3\n"),
            "expr\n  binary +\n    int 1\n    binary *\n      int 2\n      int 3\n"
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse_dump("1 - 2 - 3\n"),
            "expr\n  binary -\n    binary -\n      int 1\n      int 2\n    int 3\n"
        );
    }

    #[test]
    fn test_parens_override_precedence() {
        assert_eq!(
            parse_dump("(1 + 2) * 3\n"),
            "expr\n  binary *\n    binary +\n      int 1\n      int 2\n    int 3\n"
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            parse_dump("a + 1 < b * 2\n"),
            "expr\n  binary <\n    binary +\n      name a\n      int 1\n    binary *\n      name b\n      int 2\n"
        );
    }

    #[test]
    fn test_assignment() {
        assert_eq!(parse_dump("x = 1\n"), "assign\n  name x\n  int 1\n");
    }

    #[test]
    fn test_subscript_assignment() {
        assert_eq!(
            parse_dump("xs[0] = 5\n"),
            "assign\n  subscript\n    name xs\n    int 0\n  int 5\n"
        );
    }

    #[test]
    fn test_list_literal() {
        assert_eq!(
            parse_dump("[1, 2, 3]\n"),
            "expr\n  list\n    int 1\n    int 2\n    int 3\n"
        );
        assert_eq!(parse_dump("[]\n"), "expr\n  list\n");
        assert_eq!(parse_dump("[1,]\n"), "expr\n  list\n    int 1\n");
    }

    #[test]
    fn test_chained_subscript() {
        assert_eq!(
            parse_dump("m[0][1]\n"),
            "expr\n  subscript\n    subscript\n      name m\n      int 0\n    int 1\n"
        );
    }

    #[test]
    fn test_while_block() {
        assert_eq!(
            parse_dump("while a:\n  pass\n"),
            "while\n  name a\n  pass\n"
        );
    }

    #[test]
    fn test_if_without_else_gets_pass() {
        assert_eq!(
            parse_dump("if a:\n  print(a)\n"),
            "if\n  name a\n  print\n    name a\nelse\n  pass\n"
        );
    }

    #[test]
    fn test_elif_desugars_to_nested_if() {
        let text = "if a:\n  pass\nelif b:\n  pass\nelse:\n  pass\n";
        assert_eq!(
            parse_dump(text),
            "if\n  name a\n  pass\nelse\n  if\n    name b\n    pass\n  else\n    pass\n"
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(parse_dump("\"hi\"\n"), "expr\n  str \"hi\"\n");
    }

    #[test]
    fn test_sequence() {
        assert_eq!(
            parse_dump("a = 1\nb = 2\n"),
            "assign\n  name a\n  int 1\nassign\n  name b\n  int 2\n"
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(parse_err("a + 3 = 1\n"), "cannot assign to expression here");
    }

    #[test]
    fn test_invalid_target_span() {
        let (_, _, handler, ok) = parse("a + 3 = 1\n");
        assert!(!ok);
        let diag = &handler.diagnostics()[0];
        assert_eq!(diag.span, Span::new(0, 5));
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(parse_err("(10 - 3\n"), "expected closing parenthesis");
    }

    #[test]
    fn test_missing_indent() {
        assert_eq!(parse_err("while a:\n1\n"), "indent expected");
    }

    #[test]
    fn test_unindent_mismatch_propagates_lexer_message() {
        assert_eq!(
            parse_err("1\n  2\n 3\n"),
            "unindent does not match any outer indentation level"
        );
    }

    #[test]
    fn test_stray_top_level_indent_still_fails_at_dedent() {
        // The indented line itself parses, but the dedent that follows is
        // not a statement.
        assert_eq!(parse_err("1\n  2\n"), "expected expression");
    }

    #[test]
    fn test_lexer_error_message_wins() {
        assert_eq!(parse_err("a = `\n"), "unexpected character");
    }

    #[test]
    fn test_missing_colon() {
        assert_eq!(parse_err("while a\n  pass\n"), "expected ':'");
    }

    #[test]
    fn test_print_requires_parens() {
        assert_eq!(parse_err("print 1\n"), "expected '('");
    }

    #[test]
    fn test_missing_expression() {
        assert_eq!(parse_err("1 +\n"), "expected expression");
    }

    #[test]
    fn test_unclosed_bracket() {
        assert_eq!(parse_err("[1, 2\n"), "expected closing bracket");
    }

    #[test]
    fn test_garbage_after_statement() {
        assert_eq!(parse_err("1 2\n"), "expected end of line");
    }
}
