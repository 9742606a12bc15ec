use crate::error::SummaryError;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Forward-only line cursor over one input stream.
///
/// The only operation is [`ScanCursor::next_line`]. A cursor is owned by one
/// stage at a time and handed on by value.
pub struct ScanCursor<R> {
    reader: R,
    path: PathBuf,
    raw: Vec<u8>,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> ScanCursor<R> {
    /// `path` is only used to label errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            raw: Vec::new(),
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Next line without its terminator, or `None` at end of stream.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; only real
    /// I/O failures are errors.
    pub fn next_line(&mut self) -> Result<Option<&str>, SummaryError> {
        self.raw.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.raw)
            .map_err(|source| SummaryError::Read {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let mut end = self.raw.len();
        while end > 0 && matches!(self.raw[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        self.buf.clear();
        self.buf.push_str(&String::from_utf8_lossy(&self.raw[..end]));
        Ok(Some(&self.buf))
    }

    /// 1-based number of the line most recently returned (0 before any read).
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
