//! Abstract syntax tree node definitions.
//!
//! All nodes live in an [`Arena`] and are immutable after parsing; the
//! whole tree is released at once when the arena drops. Nodes therefore
//! hold only spans and references to other nodes, never owned heap data.
//!
//! Sequences (statements in a block, elements of a list literal) are
//! chained through an intrusive `next` link instead of owned vectors, so a
//! node never needs drop glue.

use std::cell::Cell;
use std::fmt::Write;

use rill_util::{Arena, Source, Span};

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// The operator as written in source.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// An expression node.
pub struct Expr<'ast> {
    pub kind: ExprKind<'ast>,
    /// Link to the next element when this expression sits in a list
    /// literal's element chain.
    next: Cell<Option<&'ast Expr<'ast>>>,
}

/// Kind and payload of an expression.
pub enum ExprKind<'ast> {
    /// Integer literal; the span holds the digits
    Int(Span),
    /// String literal; the span includes the surrounding quotes
    Str(Span),
    /// Identifier reference
    Name(Span),
    /// Binary operation
    Binary {
        left: &'ast Expr<'ast>,
        op: BinOp,
        right: &'ast Expr<'ast>,
    },
    /// Subscript `value[index]`; `end` is the offset just past `]`
    Subscript {
        value: &'ast Expr<'ast>,
        index: &'ast Expr<'ast>,
        end: usize,
    },
    /// List literal; elements are chained through their `next` links
    List {
        span: Span,
        first: Option<&'ast Expr<'ast>>,
    },
}

impl<'ast> Expr<'ast> {
    fn alloc(arena: &'ast Arena, kind: ExprKind<'ast>) -> &'ast Expr<'ast> {
        arena.alloc(Expr {
            kind,
            next: Cell::new(None),
        })
    }

    pub fn int(arena: &'ast Arena, span: Span) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::Int(span))
    }

    pub fn str(arena: &'ast Arena, span: Span) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::Str(span))
    }

    pub fn name(arena: &'ast Arena, span: Span) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::Name(span))
    }

    pub fn binary(
        arena: &'ast Arena,
        left: &'ast Expr<'ast>,
        op: BinOp,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::Binary { left, op, right })
    }

    pub fn subscript(
        arena: &'ast Arena,
        value: &'ast Expr<'ast>,
        index: &'ast Expr<'ast>,
        end: usize,
    ) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::Subscript { value, index, end })
    }

    pub fn list(
        arena: &'ast Arena,
        span: Span,
        first: Option<&'ast Expr<'ast>>,
    ) -> &'ast Expr<'ast> {
        Self::alloc(arena, ExprKind::List { span, first })
    }

    /// The source region this expression covers.
    pub fn span(&self) -> Span {
        match &self.kind {
            ExprKind::Int(span) | ExprKind::Str(span) | ExprKind::Name(span) => *span,
            ExprKind::Binary { left, right, .. } => left.span().merge(right.span()),
            ExprKind::Subscript { value, end, .. } => Span::new(value.span().start, *end),
            ExprKind::List { span, .. } => *span,
        }
    }

    /// Next element in a list literal chain.
    pub fn next(&self) -> Option<&'ast Expr<'ast>> {
        self.next.get()
    }

    pub(crate) fn set_next(&self, next: &'ast Expr<'ast>) {
        debug_assert!(self.next.get().is_none());
        self.next.set(Some(next));
    }
}

/// A statement node.
pub struct Stmt<'ast> {
    pub kind: StmtKind<'ast>,
    next: Cell<Option<&'ast Stmt<'ast>>>,
}

/// Kind and payload of a statement.
pub enum StmtKind<'ast> {
    /// Expression evaluated for effect, result discarded
    Expr(&'ast Expr<'ast>),
    /// Assignment; the target is a `Name` or `Subscript`
    Assign {
        target: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    },
    While {
        cond: &'ast Expr<'ast>,
        body: &'ast Stmt<'ast>,
    },
    /// `if`; a missing `else` is a synthesized `Pass`, so `else_body` is
    /// always present
    If {
        cond: &'ast Expr<'ast>,
        then_body: &'ast Stmt<'ast>,
        else_body: &'ast Stmt<'ast>,
    },
    Pass,
    Print(&'ast Expr<'ast>),
}

impl<'ast> Stmt<'ast> {
    fn alloc(arena: &'ast Arena, kind: StmtKind<'ast>) -> &'ast Stmt<'ast> {
        arena.alloc(Stmt {
            kind,
            next: Cell::new(None),
        })
    }

    pub fn expr(arena: &'ast Arena, expr: &'ast Expr<'ast>) -> &'ast Stmt<'ast> {
        Self::alloc(arena, StmtKind::Expr(expr))
    }

    pub fn assign(
        arena: &'ast Arena,
        target: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    ) -> &'ast Stmt<'ast> {
        Self::alloc(arena, StmtKind::Assign { target, value })
    }

    pub fn while_loop(
        arena: &'ast Arena,
        cond: &'ast Expr<'ast>,
        body: &'ast Stmt<'ast>,
    ) -> &'ast Stmt<'ast> {
        Self::alloc(arena, StmtKind::While { cond, body })
    }

    pub fn if_else(
        arena: &'ast Arena,
        cond: &'ast Expr<'ast>,
        then_body: &'ast Stmt<'ast>,
        else_body: &'ast Stmt<'ast>,
    ) -> &'ast Stmt<'ast> {
        Self::alloc(
            arena,
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
        )
    }

    pub fn pass(arena: &'ast Arena) -> &'ast Stmt<'ast> {
        Self::alloc(arena, StmtKind::Pass)
    }

    pub fn print(arena: &'ast Arena, expr: &'ast Expr<'ast>) -> &'ast Stmt<'ast> {
        Self::alloc(arena, StmtKind::Print(expr))
    }

    /// Next statement in the sequence.
    pub fn next(&self) -> Option<&'ast Stmt<'ast>> {
        self.next.get()
    }

    pub(crate) fn set_next(&self, next: &'ast Stmt<'ast>) {
        debug_assert!(self.next.get().is_none());
        self.next.set(Some(next));
    }
}

/// Render a statement sequence as an indented tree, for trace logging and
/// tests.
pub fn dump(stmt: &Stmt, source: &Source) -> String {
    let mut out = String::new();
    let mut cur = Some(stmt);
    while let Some(s) = cur {
        dump_stmt(&mut out, s, source, 0);
        cur = s.next();
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_stmt(out: &mut String, stmt: &Stmt, source: &Source, depth: usize) {
    indent(out, depth);
    match &stmt.kind {
        StmtKind::Expr(expr) => {
            out.push_str("expr\n");
            dump_expr(out, expr, source, depth + 1);
        }
        StmtKind::Assign { target, value } => {
            out.push_str("assign\n");
            dump_expr(out, target, source, depth + 1);
            dump_expr(out, value, source, depth + 1);
        }
        StmtKind::While { cond, body } => {
            out.push_str("while\n");
            dump_expr(out, cond, source, depth + 1);
            let mut cur = Some(*body);
            while let Some(s) = cur {
                dump_stmt(out, s, source, depth + 1);
                cur = s.next();
            }
        }
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            out.push_str("if\n");
            dump_expr(out, cond, source, depth + 1);
            let mut cur = Some(*then_body);
            while let Some(s) = cur {
                dump_stmt(out, s, source, depth + 1);
                cur = s.next();
            }
            indent(out, depth);
            out.push_str("else\n");
            let mut cur = Some(*else_body);
            while let Some(s) = cur {
                dump_stmt(out, s, source, depth + 1);
                cur = s.next();
            }
        }
        StmtKind::Pass => out.push_str("pass\n"),
        StmtKind::Print(expr) => {
            out.push_str("print\n");
            dump_expr(out, expr, source, depth + 1);
        }
    }
}

fn dump_expr(out: &mut String, expr: &Expr, source: &Source, depth: usize) {
    indent(out, depth);
    match &expr.kind {
        ExprKind::Int(span) => {
            let _ = writeln!(out, "int {}", source.slice(*span));
        }
        ExprKind::Str(span) => {
            let _ = writeln!(out, "str {}", source.slice(*span));
        }
        ExprKind::Name(span) => {
            let _ = writeln!(out, "name {}", source.slice(*span));
        }
        ExprKind::Binary { left, op, right } => {
            let _ = writeln!(out, "binary {}", op.symbol());
            dump_expr(out, left, source, depth + 1);
            dump_expr(out, right, source, depth + 1);
        }
        ExprKind::Subscript { value, index, .. } => {
            out.push_str("subscript\n");
            dump_expr(out, value, source, depth + 1);
            dump_expr(out, index, source, depth + 1);
        }
        ExprKind::List { first, .. } => {
            out.push_str("list\n");
            let mut cur = *first;
            while let Some(e) = cur {
                dump_expr(out, e, source, depth + 1);
                cur = e.next();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_compose() {
        let arena = Arena::new();
        let left = Expr::int(&arena, Span::new(0, 2));
        let right = Expr::int(&arena, Span::new(5, 7));
        let bin = Expr::binary(&arena, left, BinOp::Add, right);
        assert_eq!(bin.span(), Span::new(0, 7));

        let index = Expr::int(&arena, Span::new(8, 9));
        let sub = Expr::subscript(&arena, bin, index, 10);
        assert_eq!(sub.span(), Span::new(0, 10));
    }

    #[test]
    fn test_chaining() {
        let arena = Arena::new();
        let a = Expr::int(&arena, Span::new(0, 1));
        let b = Expr::int(&arena, Span::new(2, 3));
        a.set_next(b);
        assert!(std::ptr::eq(a.next().unwrap(), b));
        assert!(b.next().is_none());
    }

    #[test]
    fn test_dump() {
        let source = Source::from_str("t", "x = 1\n");
        let arena = Arena::new();
        let target = Expr::name(&arena, Span::new(0, 1));
        let value = Expr::int(&arena, Span::new(4, 5));
        let stmt = Stmt::assign(&arena, target, value);
        assert_eq!(dump(stmt, &source), "assign\n  name x\n  int 1\n");
    }
}
