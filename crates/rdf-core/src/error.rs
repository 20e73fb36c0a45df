//! Structured parse-error reporting shared by every decoder, plus the
//! `error_code` classifier used to match on error kind without downcasting
//! through every intermediate wrapping layer.

use std::error::Error as StdError;
use std::fmt;

/// Coarse-grained, stable error classification. Sentinel kinds survive
/// wrapping so a caller can match on `error_code()` without downcasting
/// through every intermediate layer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    UnsupportedFormat,
    LineTooLong,
    StatementTooLong,
    DepthExceeded,
    TripleLimitExceeded,
    ParseError,
    IoError,
    ContextCanceled,
    InvalidIri,
    InvalidLiteral,
}

/// Walks `err.source()` looking for a [`ParseError`] carrying a known
/// [`ErrorCode`]. Returns `None` for a `None` input and for errors with no
/// classified kind, including end-of-stream.
pub fn error_code(mut err: &(dyn StdError + 'static)) -> Option<ErrorCode> {
    loop {
        if let Some(pe) = err.downcast_ref::<ParseError>() {
            return Some(pe.code);
        }
        err = err.source()?;
    }
}

/// A 1-based line/column position plus an absolute byte offset into the
/// input stream. `line == 0` and `column == 0` mean "unknown".
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    /// Absolute byte offset, or `None` when unknown.
    pub byte_offset: Option<u64>,
}

/// A structured parse error carrying enough context to render a
/// compiler-style diagnostic.
#[derive(Debug, Clone)]
pub struct ParseError {
    code: ErrorCode,
    format: &'static str,
    position: TextPosition,
    cause: String,
    statement_excerpt: String,
}

impl ParseError {
    /// Builds a new error with no position information.
    pub fn new(code: ErrorCode, format: &'static str, cause: impl Into<String>) -> Self {
        Self {
            code,
            format,
            position: TextPosition::default(),
            cause: cause.into(),
            statement_excerpt: String::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: TextPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_statement_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.statement_excerpt = excerpt.into();
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// Re-wraps `self` as the cause of a new error at `outer`'s call site,
    /// but keeps the *innermost* non-zero position data: when an inner
    /// frame has better position data than the outer wrap call provides,
    /// the inner data wins.
    pub fn wrap(self, format: &'static str, outer_cause: impl Into<String>) -> Self {
        let position = self.position;
        let excerpt = self.statement_excerpt.clone();
        let code = self.code;
        let inner_msg = self.to_string();
        Self {
            code,
            format,
            position,
            cause: format!("{}: {inner_msg}", outer_cause.into()),
            statement_excerpt: excerpt,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.line > 0 {
            if self.position.column > 0 {
                write!(
                    f,
                    "{}:{}:{}",
                    self.format, self.position.line, self.position.column
                )?;
            } else {
                write!(f, "{}:{}", self.format, self.position.line)?;
            }
        } else if let Some(offset) = self.position.byte_offset {
            write!(f, "{} (offset {offset})", self.format)?;
        } else {
            write!(f, "{}", self.format)?;
        }
        write!(f, ": {}", self.cause)?;
        if !self.statement_excerpt.is_empty() {
            let (excerpt, caret_index) = windowed_excerpt(
                &self.statement_excerpt,
                (self.position.column > 0).then_some(self.position.column as usize),
            );
            write!(f, "\n{excerpt}\n{}^", " ".repeat(caret_index))?;
        }
        Ok(())
    }
}

impl StdError for ParseError {}

/// Builds the ±40-byte excerpt window around `column` (1-based), or a
/// leading-80-byte truncation when no column is known.
/// Returns `(excerpt, caret_offset)` where `caret_offset` is the 0-based
/// column of the caret within `excerpt`.
fn windowed_excerpt(statement: &str, column: Option<usize>) -> (String, usize) {
    let bytes = statement.as_bytes();
    match column {
        Some(column) => {
            let center = column.saturating_sub(1).min(bytes.len());
            let start = center.saturating_sub(40);
            let end = (center + 40).min(bytes.len());
            let mut excerpt = String::new();
            if start > 0 {
                excerpt.push_str("...");
            }
            let slice = String::from_utf8_lossy(&bytes[start..end]);
            excerpt.push_str(&slice);
            if end < bytes.len() {
                excerpt.push_str("...");
            }
            let caret = (center - start) + usize::from(start > 0) * 3;
            (excerpt, caret)
        }
        None => {
            let end = bytes.len().min(80);
            let mut excerpt = String::from_utf8_lossy(&bytes[..end]).into_owned();
            if bytes.len() > 80 {
                excerpt.push_str("...");
            }
            (excerpt, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_line_and_column() {
        let e = ParseError::new(ErrorCode::ParseError, "turtle", "unexpected token").with_position(
            TextPosition {
                line: 3,
                column: 5,
                byte_offset: Some(12),
            },
        );
        assert_eq!(e.to_string(), "turtle:3:5: unexpected token");
    }

    #[test]
    fn renders_offset_only() {
        let e = ParseError::new(ErrorCode::ParseError, "ntriples", "bad term").with_position(
            TextPosition {
                line: 0,
                column: 0,
                byte_offset: Some(7),
            },
        );
        assert_eq!(e.to_string(), "ntriples (offset 7): bad term");
    }

    #[test]
    fn renders_bare_format_with_no_position() {
        let e = ParseError::new(ErrorCode::ParseError, "jsonld", "bad input");
        assert_eq!(e.to_string(), "jsonld: bad input");
    }

    #[test]
    fn wrap_preserves_inner_position() {
        let inner = ParseError::new(ErrorCode::InvalidIri, "turtle", "empty IRI").with_position(
            TextPosition {
                line: 2,
                column: 9,
                byte_offset: None,
            },
        );
        let outer = inner.wrap("turtle", "while parsing object");
        assert_eq!(outer.position().line, 2);
        assert_eq!(outer.position().column, 9);
        assert_eq!(outer.code(), ErrorCode::InvalidIri);
    }

    #[test]
    fn error_code_walks_source_chain() {
        #[derive(Debug)]
        struct Wrapper(ParseError);
        impl fmt::Display for Wrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
        impl StdError for Wrapper {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }
        let wrapped = Wrapper(ParseError::new(ErrorCode::LineTooLong, "ntriples", "too long"));
        assert_eq!(error_code(&wrapped), Some(ErrorCode::LineTooLong));
    }

    #[test]
    fn excerpt_includes_caret_and_ellipsis() {
        let long = "a".repeat(100);
        let e = ParseError::new(ErrorCode::ParseError, "turtle", "oops")
            .with_position(TextPosition {
                line: 1,
                column: 60,
                byte_offset: None,
            })
            .with_statement_excerpt(long);
        let rendered = e.to_string();
        assert!(rendered.contains("..."));
        assert!(rendered.contains('^'));
    }
}
