//! Compression kinds layered over tar archives.
//!
//! - **Gzip** (.tar.gz, .tgz): default, read and write
//! - **Lz4** (.tar.lz4, .tz4): LZ4 frame format, read and write
//! - **Bzip2** (.tar.bz2, .tbz2): read only

use std::fmt;
use std::str::FromStr;

use crate::ArchiveError;
use crate::Result;

/// Compression applied to the archive byte stream.
///
/// # Examples
///
/// ```
/// use carch_core::formats::Compression;
///
/// let compression: Compression = "tgz".parse().unwrap();
/// assert_eq!(compression, Compression::Gzip);
/// assert!(compression.supports_creation());
/// assert!(!Compression::Bzip2.supports_creation());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Plain container bytes.
    None,

    /// Gzip (deflate).
    #[default]
    Gzip,

    /// Bzip2. Only decompression is available.
    Bzip2,

    /// LZ4 frame format.
    Lz4,
}

impl Compression {
    /// Returns the typical file extension for a tar archive using this
    /// compression.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::formats::Compression;
    ///
    /// assert_eq!(Compression::None.extension(), "tar");
    /// assert_eq!(Compression::Gzip.extension(), "tar.gz");
    /// assert_eq!(Compression::Lz4.extension(), "tar.lz4");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar.gz",
            Self::Bzip2 => "tar.bz2",
            Self::Lz4 => "tar.lz4",
        }
    }

    /// Returns a human-readable name for this compression.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Lz4 => "lz4",
        }
    }

    /// Returns `true` if archives can be written with this compression.
    #[must_use]
    pub const fn supports_creation(self) -> bool {
        !matches!(self, Self::Bzip2)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "tar" => Ok(Self::None),
            "gzip" | "gz" | "tar.gz" | "tgz" => Ok(Self::Gzip),
            "bzip2" | "bz2" | "tbz" | "tb2" | "tbz2" | "tar.bz2" => Ok(Self::Bzip2),
            "lz4" | "tar.lz4" | "tz4" => Ok(Self::Lz4),
            _ => Err(ArchiveError::UnsupportedCompression { name: s.to_string() }),
        }
    }
}
