//! rill-eval - the tree-walking evaluator.
//!
//! Statements execute directly against the AST; values live on the GC
//! heap and variables in a GC-managed environment. Runtime failures
//! propagate as [`RuntimeError`] and are not catchable from guest code.
//!
//! # Rooting discipline
//!
//! Every operation that allocates may trigger a collection, so the
//! evaluator must keep intermediate values reachable across allocating
//! calls:
//!
//! - a freshly produced value is rooted before the next allocating call
//!   unless it is already stored in a reachable object;
//! - for a binary operation, the left operand is rooted before the right
//!   operand is evaluated;
//! - a container under construction is rooted before it is populated, and
//!   each element is rooted across its insertion.
//!
//! Scope guards ([`rgc::Rooted`]) tie each root to a lexical scope, so
//! early error returns cannot unbalance the root stack.

use std::io::Write;

use rill_obj::{env, int, list, ops, str as strobj};
use rill_obj::{ObjKind, ObjRef, RuntimeError};
use rill_par::{BinOp, Expr, ExprKind, Stmt, StmtKind};
use rill_util::{Source, Span};

/// Execute a parsed program.
///
/// `arg` is bound to the guest variable `arg` before the first statement
/// runs. Guest output goes to `out`.
///
/// # Examples
///
/// ```
/// use rill_util::{Arena, Handler, Source};
///
/// let arena = Arena::new();
/// let source = Source::from_str("demo.rl", "print(2 + 3)\n");
/// let handler = Handler::new();
/// let program = rill_par::parse_file(&arena, &source, &handler).unwrap();
///
/// let mut out = Vec::new();
/// rill_eval::execute(program, &source, 0, &mut out).unwrap();
/// assert_eq!(out, b"5\n");
/// ```
pub fn execute<W: Write>(
    program: &Stmt,
    source: &Source,
    arg: i64,
    out: &mut W,
) -> Result<(), RuntimeError> {
    let environment = env::create();
    let _env_guard = environment.rooted();
    {
        let arg_obj = int::create(arg);
        let _arg_guard = arg_obj.rooted();
        env::define(environment, "arg", arg_obj);
    }
    let mut evaluator = Evaluator {
        source,
        env: environment,
        out,
    };
    let result = evaluator.exec_stmts(program);
    log::debug!("evaluation finished: {:?}", rgc::stats());
    result
}

struct Evaluator<'a, W: Write> {
    source: &'a Source,
    /// The global environment; rooted for the whole run by [`execute`].
    env: ObjRef,
    out: &'a mut W,
}

impl<'a, W: Write> Evaluator<'a, W> {
    fn exec_stmts(&mut self, head: &Stmt) -> Result<(), RuntimeError> {
        let mut cur = Some(head);
        while let Some(stmt) = cur {
            self.exec_stmt(stmt)?;
            cur = stmt.next();
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            StmtKind::Assign { target, value } => self.exec_assign(target, value),
            StmtKind::While { cond, body } => {
                while ops::truthy(self.eval(cond)?)? {
                    self.exec_stmts(body)?;
                }
                Ok(())
            }
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                if ops::truthy(self.eval(cond)?)? {
                    self.exec_stmts(then_body)
                } else {
                    self.exec_stmts(else_body)
                }
            }
            StmtKind::Pass => Ok(()),
            StmtKind::Print(expr) => {
                let value = self.eval(expr)?;
                match value.kind() {
                    ObjKind::Int(v) => writeln!(self.out, "{}", v),
                    ObjKind::Str(_) => writeln!(self.out, "{}", value.str_value()),
                    _ => return Err(RuntimeError::NotPrintable(value.type_name())),
                }
                .map_err(|e| RuntimeError::Output(e.to_string()))
            }
        }
    }

    fn exec_assign(&mut self, target: &Expr, value: &Expr) -> Result<(), RuntimeError> {
        match &target.kind {
            ExprKind::Name(span) => {
                let rhs = self.eval(value)?;
                let _rhs_guard = rhs.rooted();
                env::define(self.env, self.source.slice(*span), rhs);
                Ok(())
            }
            ExprKind::Subscript {
                value: receiver,
                index,
                ..
            } => {
                let receiver = self.eval(receiver)?;
                let _receiver_guard = receiver.rooted();
                let index = self.eval(index)?;
                let _index_guard = index.rooted();
                let rhs = self.eval(value)?;
                ops::set_element(receiver, index, rhs)
            }
            // The parser rejects any other assignment target.
            _ => unreachable!("invalid assignment target"),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<ObjRef, RuntimeError> {
        match &expr.kind {
            ExprKind::Int(span) => self.eval_int_literal(*span),
            ExprKind::Str(span) => {
                // Strip the surrounding quotes; escape sequences are not
                // decoded.
                let text = self.source.slice(*span);
                Ok(strobj::create(&text[1..text.len() - 1]))
            }
            ExprKind::Name(span) => {
                let name = self.source.slice(*span);
                env::lookup(self.env, name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
            }
            ExprKind::List { first, .. } => self.eval_list_literal(*first),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::Subscript { value, index, .. } => {
                let receiver = self.eval(value)?;
                let _receiver_guard = receiver.rooted();
                let index = self.eval(index)?;
                ops::get_element(receiver, index)
            }
        }
    }

    fn eval_int_literal(&mut self, span: Span) -> Result<ObjRef, RuntimeError> {
        let digits = self.source.slice(span);
        let value: i64 = digits
            .parse()
            .map_err(|_| RuntimeError::IntLiteralTooLarge)?;
        Ok(int::create(value))
    }

    fn eval_list_literal(&mut self, first: Option<&Expr>) -> Result<ObjRef, RuntimeError> {
        let mut count = 0;
        let mut cur = first;
        while let Some(e) = cur {
            count += 1;
            cur = e.next();
        }

        let result = list::create(count.max(1));
        let _result_guard = result.rooted();
        let mut cur = first;
        while let Some(e) = cur {
            let item = self.eval(e)?;
            {
                let _item_guard = item.rooted();
                list::append(result, item);
            }
            cur = e.next();
        }
        Ok(result)
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> Result<ObjRef, RuntimeError> {
        let lhs = self.eval(left)?;
        let _lhs_guard = lhs.rooted();
        let rhs = self.eval(right)?;
        let _rhs_guard = rhs.rooted();

        if lhs.is_int() && rhs.is_int() {
            let (a, b) = (lhs.int_value(), rhs.int_value());
            // Fixed-precision arithmetic wraps on overflow.
            let value = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    a.wrapping_div(b)
                }
                // Comparisons produce int 0/1.
                BinOp::Eq => (a == b) as i64,
                BinOp::Ne => (a != b) as i64,
                BinOp::Lt => (a < b) as i64,
                BinOp::Le => (a <= b) as i64,
                BinOp::Gt => (a > b) as i64,
                BinOp::Ge => (a >= b) as i64,
            };
            return Ok(int::create(value));
        }

        if op == BinOp::Add && lhs.is_str() && rhs.is_str() {
            return Ok(strobj::concat(lhs, rhs));
        }

        Err(RuntimeError::OperandsMustBeIntegers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_par::parse_file;
    use rill_util::{Arena, Handler};

    /// Parse and execute a program, capturing its output.
    fn run(text: &str, arg: i64) -> Result<String, RuntimeError> {
        let arena = Arena::new();
        let source = Source::from_str("test.rl", text);
        let handler = Handler::new();
        let program = parse_file(&arena, &source, &handler)
            .unwrap_or_else(|| panic!("parse failed: {:?}", handler.diagnostics()));
        let mut out = Vec::new();
        execute(program, &source, arg, &mut out)?;
        Ok(String::from_utf8(out).expect("guest output is UTF-8"))
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(run("print(1 + 2 * 3)\n", 0).unwrap(), "7\n");
        assert_eq!(run("print((1 + 2) * 3)\n", 0).unwrap(), "9\n");
        assert_eq!(run("print(10 - 2 - 3)\n", 0).unwrap(), "5\n");
        assert_eq!(run("print(7 / 2)\n", 0).unwrap(), "3\n");
        assert_eq!(run("print(0 - 5)\n", 0).unwrap(), "-5\n");
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run("a = 10\nwhile a > 0:\n  print(a)\n  a = a - 3\n", 0).unwrap(),
            "10\n7\n4\n1\n"
        );
    }

    #[test]
    fn test_if_elif_else() {
        let program = "if arg == 0:\n  print(\"zero\")\nelif arg == 1:\n  print(\"one\")\nelse:\n  print(\"many\")\n";
        assert_eq!(run(program, 0).unwrap(), "zero\n");
        assert_eq!(run(program, 1).unwrap(), "one\n");
        assert_eq!(run(program, 7).unwrap(), "many\n");
    }

    #[test]
    fn test_list_subscript() {
        assert_eq!(
            run("xs = [10, 20, 30]\nxs[1] = 99\nprint(xs[0] + xs[1] + xs[2])\n", 0).unwrap(),
            "139\n"
        );
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(run("s = \"ab\" + \"cd\"\nprint(s)\n", 0).unwrap(), "abcd\n");
    }

    #[test]
    fn test_string_subscript() {
        assert_eq!(run("s = \"abc\"\nprint(s[1])\nprint(s[0 - 1])\n", 0).unwrap(), "b\nc\n");
    }

    #[test]
    fn test_comparisons_produce_ints() {
        assert_eq!(run("print(1 < 2)\n", 0).unwrap(), "1\n");
        assert_eq!(run("print(2 <= 1)\n", 0).unwrap(), "0\n");
        assert_eq!(run("print(3 == 3)\n", 0).unwrap(), "1\n");
        assert_eq!(run("print(3 != 3)\n", 0).unwrap(), "0\n");
    }

    #[test]
    fn test_truthiness_of_conditions() {
        assert_eq!(run("if \"\":\n  print(1)\nelse:\n  print(2)\n", 0).unwrap(), "2\n");
        assert_eq!(run("if \"x\":\n  print(1)\n", 0).unwrap(), "1\n");
        assert_eq!(run("if []:\n  print(1)\nelse:\n  print(2)\n", 0).unwrap(), "2\n");
        assert_eq!(run("if [0]:\n  print(1)\n", 0).unwrap(), "1\n");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run("1 / 0\n", 0), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run("print(missing)\n", 0),
            Err(RuntimeError::UndefinedVariable("missing".into()))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(
            run("xs = [1]\nprint(xs[1])\n", 0),
            Err(RuntimeError::IndexOutOfRange)
        );
        assert_eq!(
            run("xs = [1]\nxs[0 - 2] = 9\n", 0),
            Err(RuntimeError::IndexOutOfRange)
        );
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            run("x = 1 + \"a\"\n", 0),
            Err(RuntimeError::OperandsMustBeIntegers)
        );
        assert_eq!(
            run("x = \"a\" - \"b\"\n", 0),
            Err(RuntimeError::OperandsMustBeIntegers)
        );
        assert_eq!(
            run("x = 1[0]\n", 0),
            Err(RuntimeError::NotSubscriptable("int"))
        );
        assert_eq!(
            run("\"a\"[0] = \"b\"\n", 0),
            Err(RuntimeError::NoItemAssignment("str"))
        );
        assert_eq!(
            run("print([1])\n", 0),
            Err(RuntimeError::NotPrintable("list"))
        );
    }

    #[test]
    fn test_int_literal_bounds() {
        assert_eq!(
            run("print(9223372036854775807)\n", 0).unwrap(),
            "9223372036854775807\n"
        );
        assert_eq!(
            run("print(9223372036854775808)\n", 0),
            Err(RuntimeError::IntLiteralTooLarge)
        );
    }

    #[test]
    fn test_empty_list_literal() {
        // An empty literal still gets a usable backing array.
        assert_eq!(run("xs = []\nif xs:\n  print(1)\nelse:\n  print(0)\n", 0).unwrap(), "0\n");
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(
            run("m = [[1, 2], [3, 4]]\nprint(m[1][0])\n", 0).unwrap(),
            "3\n"
        );
        assert_eq!(
            run("m = [[1, 2], [3, 4]]\nm[0][1] = 9\nprint(m[0][1])\n", 0).unwrap(),
            "9\n"
        );
    }

    #[test]
    fn test_arg_binding() {
        assert_eq!(run("print(arg)\n", 42).unwrap(), "42\n");
        assert_eq!(run("print(arg + 1)\n", 0).unwrap(), "1\n");
    }

    #[test]
    fn test_rebinding() {
        assert_eq!(run("x = 1\nx = x + 1\nx = x * 10\nprint(x)\n", 0).unwrap(), "20\n");
    }

    #[test]
    fn test_allocation_pressure_with_small_threshold() {
        // Force frequent collections so that any missing root in the
        // evaluator shows up as corruption here.
        rgc::configure(rgc::GcConfig {
            initial_threshold: 4,
            ..rgc::GcConfig::default()
        });
        let program = "\
total = 0
i = 0
s = \"\"
while i < 200:
  xs = [i, i + 1, [i * 2, \"pad\" + \"ding\"]]
  total = total + xs[0] + xs[1] + xs[2][0]
  s = s + \"x\"
  i = i + 1
print(total)
print(s[0] + s[199])
";
        assert_eq!(run(program, 0).unwrap(), "79800\nxx\n");
        // All roots are released once execution finishes.
        assert_eq!(rgc::stats().roots_count, 0);
    }

    #[test]
    fn test_garbage_is_reclaimed_during_run() {
        rgc::configure(rgc::GcConfig {
            initial_threshold: 8,
            ..rgc::GcConfig::default()
        });
        let program = "\
i = 0
while i < 500:
  trash = [1, 2, 3, 4, 5]
  i = i + 1
print(i)
";
        assert_eq!(run(program, 0).unwrap(), "500\n");
        let stats = rgc::stats();
        assert!(stats.cycles > 0, "collections must have run");
        assert!(
            stats.objects_count < 100,
            "dead lists must have been reclaimed, {} live",
            stats.objects_count
        );
    }
}
