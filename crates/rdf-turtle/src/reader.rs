//! Line-oriented byte reader shared by every concrete-syntax engine:
//! configurable line/byte limits, cancellation-aware reads, 1-based
//! line/column bookkeeping, and a one-time BOM skip.

use crate::cancellation::CancellationToken;
use rdf_core::{ErrorCode, ParseError, TextPosition};
use std::io::{self, BufRead};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Wraps a [`BufRead`], handing out one logical line at a time while
/// tracking position for diagnostics.
pub struct LineReader<R> {
    inner: R,
    format: &'static str,
    max_line_bytes: usize,
    line: u64,
    byte_offset: u64,
    bom_checked: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, format: &'static str) -> Self {
        Self {
            inner,
            format,
            max_line_bytes: 0,
            line: 0,
            byte_offset: 0,
            bom_checked: false,
        }
    }

    #[must_use]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    pub fn position(&self) -> TextPosition {
        TextPosition {
            line: self.line,
            column: 0,
            byte_offset: Some(self.byte_offset),
        }
    }

    /// Reads the next line (without its trailing `\n` / `\r\n`), or `None`
    /// at end of stream. `max_bytes == 0` means unlimited.
    pub fn read_line(
        &mut self,
        cancellation: &impl CancellationToken,
    ) -> Result<Option<String>, ParseError> {
        if cancellation.is_canceled() {
            return Err(ParseError::new(
                ErrorCode::ContextCanceled,
                self.format,
                "decoding was canceled",
            )
            .with_position(self.position()));
        }
        let mut raw = Vec::new();
        let read = self
            .inner
            .read_until(b'\n', &mut raw)
            .map_err(|e| self.io_error(e))?;
        if read == 0 {
            return Ok(None);
        }
        if !self.bom_checked {
            self.bom_checked = true;
            if raw.starts_with(UTF8_BOM) {
                self.byte_offset += UTF8_BOM.len() as u64;
                raw.drain(..UTF8_BOM.len());
            }
        }
        self.byte_offset += raw.len() as u64;
        self.line += 1;
        while raw.last() == Some(&b'\n') || raw.last() == Some(&b'\r') {
            raw.pop();
        }
        if self.max_line_bytes > 0 && raw.len() > self.max_line_bytes {
            return Err(ParseError::new(
                ErrorCode::LineTooLong,
                self.format,
                format!(
                    "line exceeds the configured maximum of {} bytes",
                    self.max_line_bytes
                ),
            )
            .with_position(self.position()));
        }
        let line = String::from_utf8(raw).map_err(|e| {
            ParseError::new(ErrorCode::ParseError, self.format, format!("invalid UTF-8: {e}"))
                .with_position(self.position())
        })?;
        Ok(Some(line))
    }

    /// Skips to the next newline without enforcing `max_line_bytes`, used
    /// to recover past a line already validated in tolerant drivers.
    pub fn discard_line(&mut self) -> io::Result<()> {
        let mut raw = Vec::new();
        let read = self.inner.read_until(b'\n', &mut raw)?;
        self.byte_offset += read as u64;
        if read > 0 {
            self.line += 1;
        }
        Ok(())
    }

    fn io_error(&self, e: io::Error) -> ParseError {
        ParseError::new(ErrorCode::IoError, self.format, e.to_string()).with_position(self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom_once() {
        let data = b"\xef\xbb\xbf<a> <b> <c> .\n<a> <b> <c> .\n".to_vec();
        let mut r = LineReader::new(io::Cursor::new(data), "ntriples");
        let first = r.read_line(&crate::cancellation::NeverCancel).unwrap().unwrap();
        assert_eq!(first, "<a> <b> <c> .");
        let second = r.read_line(&crate::cancellation::NeverCancel).unwrap().unwrap();
        assert_eq!(second, "<a> <b> <c> .");
    }

    #[test]
    fn enforces_max_line_bytes() {
        let data = b"012345678901234567890\n".to_vec();
        let mut r = LineReader::new(io::Cursor::new(data), "ntriples").with_max_line_bytes(5);
        let err = r.read_line(&crate::cancellation::NeverCancel).unwrap_err();
        assert_eq!(err.code(), ErrorCode::LineTooLong);
    }

    #[test]
    fn accepts_crlf_and_lf() {
        let data = b"a\r\nb\n".to_vec();
        let mut r = LineReader::new(io::Cursor::new(data), "ntriples");
        assert_eq!(r.read_line(&crate::cancellation::NeverCancel).unwrap().unwrap(), "a");
        assert_eq!(r.read_line(&crate::cancellation::NeverCancel).unwrap().unwrap(), "b");
        assert!(r.read_line(&crate::cancellation::NeverCancel).unwrap().is_none());
    }
}
