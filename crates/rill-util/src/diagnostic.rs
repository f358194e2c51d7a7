//! Diagnostic module - error and warning collection and rendering.
//!
//! The parser and lexer report problems through a [`Handler`] instead of
//! printing directly. The driver renders collected diagnostics against the
//! source; unit tests inspect them in place. A rendered diagnostic looks
//! like:
//!
//! ```text
//! script.rl:2:5: error: expected closing parenthesis
//!     x = (a + 1
//!         ^
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::source::Source;
use crate::span::Span;

/// Diagnostic severity level.
///
/// # Examples
///
/// ```
/// use rill_util::diagnostic::Level;
///
/// assert_eq!(format!("{}", Level::Error), "error");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that prevents evaluation
    Error,
    /// A warning that does not prevent evaluation
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with severity and location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level
    pub level: Level,
    /// Main diagnostic message
    pub message: String,
    /// Source location
    pub span: Span,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            span,
        }
    }

    /// Render this diagnostic against its source.
    ///
    /// The output is `filename:line:col: level: message`, followed by the
    /// offending line and a caret underline, except when the line is empty.
    /// The underline is at least one caret and is clamped to a single caret
    /// when the span leaks past the end of the line.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill_util::{Diagnostic, Source, Span};
    ///
    /// let source = Source::from_str("demo.rl", "a = $\n");
    /// let rendered = Diagnostic::error("unexpected character", Span::new(4, 5))
    ///     .render(&source);
    /// assert!(rendered.starts_with("demo.rl:1:5: error: unexpected character"));
    /// ```
    pub fn render(&self, source: &Source) -> String {
        let (line, column) = source.line_col(self.span.start);
        let mut out = format!(
            "{}:{}:{}: {}: {}\n",
            source.filename(),
            line,
            column,
            self.level,
            self.message
        );

        let line_start = source.line_start(line);
        let line_end = source.line_end(line);
        if line_start == line_end {
            return out;
        }
        out.push_str(source.line_text(line));
        out.push('\n');

        let mut length = self.span.len();
        if length == 0 || self.span.end > line_end {
            length = 1;
        }
        for _ in 1..column {
            out.push(' ');
        }
        for _ in 0..length {
            out.push('^');
        }
        out.push('\n');
        out
    }
}

/// Handler collecting diagnostics during a parse.
///
/// # Examples
///
/// ```
/// use rill_util::{Handler, Span};
///
/// let handler = Handler::new();
/// handler.error("expected expression", Span::DUMMY);
/// assert!(handler.has_errors());
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error at the given span.
    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error(message, span));
    }

    /// Report a warning at the given span.
    pub fn warning(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::warning(message, span));
    }

    /// Emit a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Check if any errors have been reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of reported errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Snapshot of all collected diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Clear all diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}
