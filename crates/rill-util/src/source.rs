//! Source module - normalized source text with a lazy line index.
//!
//! A [`Source`] owns the text of one script. On construction all line
//! endings are normalized to `\n` and a trailing `\n` is appended if the
//! text does not already end with one. The rest of the pipeline relies on
//! both guarantees: the lexer never has to look for `\r`, and every line
//! (including the last) is `\n`-terminated.
//!
//! Line lookups are served from an index of line-start offsets that is
//! built on first use; a source that never produces a diagnostic never pays
//! for the index.

use std::cell::OnceCell;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::span::Span;

/// Error produced when a source file cannot be loaded.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unable to read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Normalized source text plus filename and lazy line index.
///
/// Tokens and AST nodes refer into the text by byte offsets ([`Span`]),
/// so the `Source` must outlive everything derived from it; the borrow
/// checker enforces this.
///
/// # Examples
///
/// ```
/// use rill_util::source::Source;
///
/// let source = Source::from_str("demo.rl", "a = 1");
/// assert_eq!(source.text(), "a = 1\n");
/// assert_eq!(source.filename(), "demo.rl");
/// ```
pub struct Source {
    /// Name used in diagnostics (path or display name).
    filename: String,
    /// Normalized text, always ending with `\n`.
    text: String,
    /// Byte offsets of line starts, built on first use. The final entry is
    /// the offset just past the last `\n`, giving end-of-file diagnostics a
    /// phantom empty line to point at.
    line_starts: OnceCell<Vec<usize>>,
}

impl Source {
    /// Read and normalize a source file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Source, SourceError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_str(path.display().to_string(), &raw))
    }

    /// Build a source from a string, normalizing line endings.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill_util::source::Source;
    ///
    /// let source = Source::from_str("t", "a\r\nb\rc");
    /// assert_eq!(source.text(), "a\nb\nc\n");
    /// ```
    pub fn from_str(filename: impl Into<String>, raw: &str) -> Source {
        Source {
            filename: filename.into(),
            text: normalize(raw),
            line_starts: OnceCell::new(),
        }
    }

    /// Name of the source, as shown in diagnostics.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The normalized text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the normalized text in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True only for a source that would be empty even after normalization;
    /// never the case, since normalization appends a newline.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text covered by a span.
    ///
    /// # Panics
    ///
    /// Panics if the span does not lie within the text.
    #[inline]
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    fn line_starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            for (i, b) in self.text.bytes().enumerate() {
                if b == b'\n' {
                    starts.push(i + 1);
                }
            }
            starts
        })
    }

    /// Number of lines, counting the phantom empty line after the final
    /// newline.
    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    /// 1-based line number containing the given byte offset.
    ///
    /// `offset` may equal `len()`, in which case the phantom final line is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill_util::source::Source;
    ///
    /// let source = Source::from_str("t", "ab\ncd\n");
    /// assert_eq!(source.line_of(0), 1);
    /// assert_eq!(source.line_of(4), 2);
    /// ```
    pub fn line_of(&self, offset: usize) -> usize {
        debug_assert!(offset <= self.text.len());
        let starts = self.line_starts();
        match starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(insert_point) => insert_point,
        }
    }

    /// 1-based (line, column) of the given byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line_of(offset);
        let col = offset - self.line_start(line) + 1;
        (line, col)
    }

    /// Byte offset where the given 1-based line starts.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts()[line - 1]
    }

    /// Byte offset of the newline terminating the given 1-based line, or
    /// the end of text for the phantom final line.
    pub fn line_end(&self, line: usize) -> usize {
        let starts = self.line_starts();
        match starts.get(line) {
            Some(&next_start) => next_start - 1,
            None => self.text.len(),
        }
    }

    /// Text of the given 1-based line, without the terminating newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use rill_util::source::Source;
    ///
    /// let source = Source::from_str("t", "ab\ncd\n");
    /// assert_eq!(source.line_text(2), "cd");
    /// ```
    pub fn line_text(&self, line: usize) -> &str {
        &self.text[self.line_start(line)..self.line_end(line)]
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("filename", &self.filename)
            .field("len", &self.text.len())
            .finish()
    }
}

/// Rewrite `\r\n` and lone `\r` to `\n` and guarantee a trailing `\n`.
fn normalize(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len() + 1);
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            text.push('\n');
        } else {
            text.push(c);
        }
    }
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_normalize_crlf() {
        let source = Source::from_str("t", "a\r\nb\r\n");
        assert_eq!(source.text(), "a\nb\n");
    }

    #[test]
    fn test_normalize_lone_cr() {
        let source = Source::from_str("t", "a\rb");
        assert_eq!(source.text(), "a\nb\n");
    }

    #[test]
    fn test_normalize_appends_newline() {
        let source = Source::from_str("t", "abc");
        assert_eq!(source.text(), "abc\n");
    }

    #[test]
    fn test_normalize_empty() {
        let source = Source::from_str("t", "");
        assert_eq!(source.text(), "\n");
    }

    #[test]
    fn test_line_of() {
        let source = Source::from_str("t", "ab\ncd\nef\n");
        assert_eq!(source.line_of(0), 1);
        assert_eq!(source.line_of(2), 1);
        assert_eq!(source.line_of(3), 2);
        assert_eq!(source.line_of(5), 2);
        assert_eq!(source.line_of(6), 3);
        // End of text lands on the phantom final line.
        assert_eq!(source.line_of(9), 4);
    }

    #[test]
    fn test_line_col() {
        let source = Source::from_str("t", "ab\ncd\n");
        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(1), (1, 2));
        assert_eq!(source.line_col(4), (2, 2));
    }

    #[test]
    fn test_line_text() {
        let source = Source::from_str("t", "ab\ncd\n");
        assert_eq!(source.line_text(1), "ab");
        assert_eq!(source.line_text(2), "cd");
        assert_eq!(source.line_text(3), "");
    }

    #[test]
    fn test_line_count() {
        let source = Source::from_str("t", "ab\ncd\n");
        assert_eq!(source.line_count(), 3);
    }

    #[test]
    fn test_slice() {
        let source = Source::from_str("t", "hello world");
        assert_eq!(source.slice(Span::new(6, 11)), "world");
    }

    #[quickcheck]
    fn prop_normalize_idempotent(raw: String) -> bool {
        let once = normalize(&raw);
        normalize(&once) == once
    }

    #[quickcheck]
    fn prop_normalized_ends_with_newline(raw: String) -> bool {
        normalize(&raw).ends_with('\n')
    }

    #[quickcheck]
    fn prop_no_carriage_returns(raw: String) -> bool {
        !normalize(&raw).contains('\r')
    }
}
