//! Compression stream wrapping for archive creation.
//!
//! User levels follow a consistent 1-9 scale:
//!
//! - **1-3**: Fast compression
//! - **6**: Default compression
//! - **7-9**: Best compression
//!
//! LZ4 frames have no level knob; the level is ignored there.

use std::io;
use std::io::Write;

use flate2::write::GzEncoder;
use lz4_flex::frame::FrameEncoder;

use crate::ArchiveError;
use crate::Result;
use crate::formats::Compression;

/// Converts user compression level (1-9) to flate2 compression level.
///
/// # Examples
///
/// ```
/// use carch_core::creation::compression::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(1)), flate2::Compression::fast());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

/// Writer that applies the configured compression to everything written
/// through it.
pub enum CompressedWriter<W: Write> {
    /// Bytes pass through untouched.
    Plain(W),
    /// Gzip stream.
    Gzip(GzEncoder<W>),
    /// LZ4 frame.
    Lz4(FrameEncoder<W>),
}

impl<W: Write> CompressedWriter<W> {
    /// Flushes the compression trailer and returns the inner writer.
    pub fn finish(self) -> Result<W> {
        match self {
            Self::Plain(inner) => Ok(inner),
            Self::Gzip(encoder) => Ok(encoder.finish()?),
            Self::Lz4(encoder) => encoder
                .finish()
                .map_err(|e| ArchiveError::Io(io::Error::other(e))),
        }
    }

    /// Returns the compression applied by this writer.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        match self {
            Self::Plain(_) => Compression::None,
            Self::Gzip(_) => Compression::Gzip,
            Self::Lz4(_) => Compression::Lz4,
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
            Self::Lz4(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(encoder) => encoder.flush(),
            Self::Lz4(encoder) => encoder.flush(),
        }
    }
}

/// Wraps `sink` in the encoder for `compression`.
///
/// # Errors
///
/// Returns [`ArchiveError::CompressionNotSupported`] for bzip2, which can
/// only be decoded.
///
/// # Examples
///
/// ```
/// use carch_core::creation::compression::wrap;
/// use carch_core::formats::Compression;
/// use std::io::Write;
///
/// let mut writer = wrap(Vec::new(), Compression::Gzip, Some(6)).unwrap();
/// writer.write_all(b"hello").unwrap();
/// let bytes = writer.finish().unwrap();
/// assert_eq!(&bytes[..2], &[0x1F, 0x8B]);
/// ```
pub fn wrap<W: Write>(
    sink: W,
    compression: Compression,
    level: Option<u8>,
) -> Result<CompressedWriter<W>> {
    match compression {
        Compression::None => Ok(CompressedWriter::Plain(sink)),
        Compression::Gzip => Ok(CompressedWriter::Gzip(GzEncoder::new(
            sink,
            compression_level_to_flate2(level),
        ))),
        Compression::Lz4 => Ok(CompressedWriter::Lz4(FrameEncoder::new(sink))),
        Compression::Bzip2 => Err(ArchiveError::CompressionNotSupported {
            name: Compression::Bzip2.name(),
        }),
    }
}
