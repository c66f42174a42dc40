//! Line reader for the input stream
//!
//! Splits a byte stream into protocol lines, one candidate request each.
//! Lines are delivered in arrival order and nothing is buffered beyond the
//! next line boundary.
//!
//! - `\n` ends a line; a trailing `\r` is stripped as well
//! - a final line without a newline is still delivered
//! - invalid UTF-8 is decoded lossily, so it surfaces as a parse error
//!   response instead of stopping the reader
//! - end of stream ends the sequence without error

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use wprpc_core::Result;

/// Reads newline-delimited lines from an async byte stream
pub struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Read the next line, or `None` once the stream has ended
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the underlying read fails.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self.inner.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
