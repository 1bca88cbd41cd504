//! Byte counting for the finished archive size.

use std::io;
use std::io::Write;

/// Writer that records how many bytes reached the inner writer.
///
/// Sits between the compression encoder and the destination file, so the
/// count is the archive's size on disk once everything is flushed.
///
/// # Examples
///
/// ```
/// use carch_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"ustar")?;
/// assert_eq!(writer.total_bytes(), 5);
/// assert_eq!(writer.into_inner(), b"ustar");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner` with a zeroed counter.
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Bytes accepted by the inner writer so far.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns a reference to the inner writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
