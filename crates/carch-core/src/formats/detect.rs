//! Archive format detection by magic number.
//!
//! Only the leading bytes of the input and the 8-byte window at offset 257
//! (the POSIX/GNU tar magic) are inspected. The file name never matters.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::str::FromStr;

use crate::ArchiveError;
use crate::Result;

/// Offset of the tar magic inside the first 512-byte header block.
pub const TAR_MAGIC_OFFSET: u64 = 257;

/// Number of leading bytes the signature table needs.
pub const HEAD_LEN: usize = 8;

const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const ZIP_EMPTY_MAGIC: &[u8] = &[0x50, 0x4B, 0x05, 0x06];
const ZIP_SPANNED_MAGIC: &[u8] = &[0x50, 0x4B, 0x07, 0x08];
const BZIP2_MAGIC: &[u8] = &[0x42, 0x5A, 0x68];
const LZH_MAGIC: &[u8] = &[0x1F, 0xA0];
const LZW_MAGIC: &[u8] = &[0x1F, 0x9D];
const LZ4_MAGIC: &[u8] = &[0x18, 0x4D, 0x22, 0x04];
// LZ4 frame magic as it appears on disk (0x184D2204 little-endian).
const LZ4_FRAME_MAGIC: &[u8] = &[0x04, 0x22, 0x4D, 0x18];
const RAR_MAGIC: &[u8] = &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00];
const RAR_OLD_MAGIC: &[u8] = &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00];
const TAR_USTAR_MAGIC: &[u8] = &[0x75, 0x73, 0x74, 0x61, 0x72, 0x00, 0x30, 0x30];
const TAR_GNU_MAGIC: &[u8] = &[0x75, 0x73, 0x74, 0x61, 0x72, 0x20, 0x20, 0x00];
const TAR_ALT_MAGIC: &[u8] = &[0x75, 0x73, 0x74, 0x61, 0x72, 0x00, 0x20, 0x00];

/// Archive and compression formats the sniffer can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Gzip stream, assumed to wrap a tar archive.
    Gzip,
    /// Uncompressed tar archive.
    Tar,
    /// Zip archive with a local file header.
    Zip,
    /// Bzip2 stream, assumed to wrap a tar archive.
    Bzip2,
    /// Unix `compress` (LZW) stream.
    Lzw,
    /// LZ4 frame, assumed to wrap a tar archive.
    Lz4,
    /// RAR 5.0 and later.
    Rar,
    /// RAR prior to 1.5.
    RarOld,
    /// Zip archive that contains no entries.
    ZipEmpty,
    /// Spanned (multi-volume) zip archive.
    ZipSpanned,
    /// LHA/LZH archive.
    Lzh,
}

impl Format {
    /// Returns the human-readable name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Tar => "tar",
            Self::Zip => "zip",
            Self::Bzip2 => "bzip2",
            Self::Lzw => "lzw",
            Self::Lz4 => "lz4",
            Self::Rar => "rar post 5.0",
            Self::RarOld => "rar pre 1.5",
            Self::ZipEmpty => "empty zip archive",
            Self::ZipSpanned => "spanned zip archive",
            Self::Lzh => "lzh",
        }
    }

    /// Returns `true` if the sniffer reports this format as an error
    /// rather than a usable tag.
    #[must_use]
    pub const fn is_rejected_by_sniffer(self) -> bool {
        matches!(
            self,
            Self::Rar | Self::RarOld | Self::ZipEmpty | Self::ZipSpanned | Self::Lzh
        )
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ArchiveError;

    /// Parses a format name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" | "tar.gz" | "tgz" => Ok(Self::Gzip),
            "tar" => Ok(Self::Tar),
            "zip" => Ok(Self::Zip),
            "bzip2" | "bz2" | "tbz" | "tb2" | "tbz2" | "tar.bz2" => Ok(Self::Bzip2),
            "lzh" => Ok(Self::Lzh),
            "lzw" | "taz" | "tz" | "tar.z" => Ok(Self::Lzw),
            "lz4" | "tar.lz4" | "tz4" => Ok(Self::Lz4),
            "rar" => Ok(Self::Rar),
            _ => Err(ArchiveError::UnsupportedFormat),
        }
    }
}

/// Signature table, checked in order. The first match wins.
const SIGNATURES: &[(&[u8], Format)] = &[
    (GZIP_MAGIC, Format::Gzip),
    (ZIP_MAGIC, Format::Zip),
    (LZW_MAGIC, Format::Lzw),
    (LZ4_MAGIC, Format::Lz4),
    (LZ4_FRAME_MAGIC, Format::Lz4),
    (BZIP2_MAGIC, Format::Bzip2),
    (RAR_OLD_MAGIC, Format::RarOld),
    (RAR_MAGIC, Format::Rar),
    (ZIP_EMPTY_MAGIC, Format::ZipEmpty),
    (ZIP_SPANNED_MAGIC, Format::ZipSpanned),
    (LZH_MAGIC, Format::Lzh),
];

/// Classifies raw bytes.
///
/// `head` holds the first bytes of the input and `tar_window` the bytes
/// found at [`TAR_MAGIC_OFFSET`]. Either slice may be shorter than the
/// signatures it is compared against; a short slice never matches.
///
/// # Errors
///
/// Returns [`ArchiveError::FormatNotSupported`] for recognized formats that
/// cannot be handled, and [`ArchiveError::UnsupportedFormat`] when nothing
/// matches.
///
/// # Examples
///
/// ```
/// use carch_core::formats::{detect_bytes, Format};
///
/// let format = detect_bytes(&[0x1F, 0x8B, 0x08, 0x00], &[]).unwrap();
/// assert_eq!(format, Format::Gzip);
///
/// assert!(detect_bytes(&[0x1F, 0xA0], &[]).is_err());
/// ```
pub fn detect_bytes(head: &[u8], tar_window: &[u8]) -> Result<Format> {
    if let Some(result) = match_head(head) {
        return result;
    }
    match_tar_window(tar_window)
}

/// Checks the leading signatures. `None` means the tar window decides.
fn match_head(head: &[u8]) -> Option<Result<Format>> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| head.starts_with(magic))
        .map(|&(_, format)| {
            if format.is_rejected_by_sniffer() {
                Err(ArchiveError::FormatNotSupported { format })
            } else {
                Ok(format)
            }
        })
}

fn match_tar_window(tar_window: &[u8]) -> Result<Format> {
    if [TAR_USTAR_MAGIC, TAR_GNU_MAGIC, TAR_ALT_MAGIC]
        .iter()
        .any(|magic| tar_window.starts_with(magic))
    {
        return Ok(Format::Tar);
    }
    Err(ArchiveError::UnsupportedFormat)
}

/// Identifies the format of a seekable input.
///
/// Reads at most [`HEAD_LEN`] bytes at offset 0 and, only when none of the
/// leading signatures match, 8 bytes at offset 257. The reader is rewound to
/// the start afterwards so the caller can hand it straight to a decoder.
///
/// # Errors
///
/// Returns an I/O error if seeking fails, otherwise the same errors as
/// [`detect_bytes`].
pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<Format> {
    reader.seek(SeekFrom::Start(0))?;
    let head = read_window(reader, HEAD_LEN)?;

    let result = match match_head(&head) {
        Some(result) => result,
        None => {
            reader.seek(SeekFrom::Start(TAR_MAGIC_OFFSET))?;
            let tar_window = read_window(reader, TAR_USTAR_MAGIC.len())?;
            match_tar_window(&tar_window)
        }
    };
    reader.seek(SeekFrom::Start(0))?;

    match &result {
        Ok(format) => tracing::debug!(%format, "sniffed archive format"),
        Err(e) => tracing::debug!(error = %e, "format sniffing failed"),
    }
    result
}

/// Opens `path` and identifies its format.
pub fn detect_path(path: &Path) -> Result<Format> {
    let mut file = File::open(path)?;
    detect(&mut file)
}

/// Reads up to `len` bytes, stopping early at end of input.
fn read_window<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
