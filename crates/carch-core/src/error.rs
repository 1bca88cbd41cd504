//! Error types for archive creation, sniffing and extraction.

use std::path::PathBuf;
use thiserror::Error;

use crate::formats::Format;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while creating, sniffing or extracting archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// No destination path was configured.
    #[error("destination required")]
    DestinationRequired,

    /// No source paths were configured.
    #[error("source required")]
    SourceRequired,

    /// A configured source path does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// The destination exists and the collision policy forbids reuse.
    #[error("destination already exists: {path}")]
    DestinationExists {
        /// The conflicting destination path.
        path: PathBuf,
    },

    /// Extraction destination exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A glob pattern or date format could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Compression level is out of range.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The sniffed format is recognized but cannot be handled.
    #[error("{format} not supported")]
    FormatNotSupported {
        /// The recognized format.
        format: Format,
    },

    /// No known signature matched the input.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// A compression name could not be parsed.
    #[error("unsupported compression type: {name}")]
    UnsupportedCompression {
        /// The rejected name.
        name: String,
    },

    /// A container name could not be parsed.
    #[error("unsupported archive format: {name}")]
    UnsupportedContainer {
        /// The rejected name.
        name: String,
    },

    /// The compression kind can be read but not written.
    #[error("{name} compression is not supported for archive creation")]
    CompressionNotSupported {
        /// Compression name.
        name: &'static str,
    },

    /// Archive entry has a type that extraction does not handle.
    #[error("unsupported entry type {type_code:#04x} for {path}")]
    UnsupportedEntryType {
        /// The entry path as stored in the archive.
        path: PathBuf,
        /// Raw type code from the entry header.
        type_code: u8,
    },

    /// Archive is corrupted or invalid.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Entry path escapes the extraction root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The path that attempted traversal.
        path: PathBuf,
    },

    /// A source file changed size between collection and copy.
    #[error("{path} changed while archiving: expected {expected} bytes, read {actual}")]
    SourceChanged {
        /// The file that changed.
        path: PathBuf,
        /// Size recorded when the file was collected.
        expected: u64,
        /// Bytes actually copied.
        actual: u64,
    },

    /// The entry queue was closed before a producer finished.
    #[error("entry queue closed while walking {root}")]
    QueueClosed {
        /// Root being walked when the send failed.
        root: PathBuf,
    },

    /// A worker thread panicked.
    #[error("{worker} thread panicked")]
    WorkerPanicked {
        /// Which worker died.
        worker: &'static str,
    },
}

impl ArchiveError {
    /// Returns `true` if the error was raised while validating input,
    /// before any file was created.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::ArchiveError;
    ///
    /// assert!(ArchiveError::DestinationRequired.is_configuration_error());
    /// assert!(!ArchiveError::UnsupportedFormat.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DestinationRequired
                | Self::SourceRequired
                | Self::SourceNotFound { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidCompressionLevel { .. }
                | Self::UnsupportedCompression { .. }
                | Self::UnsupportedContainer { .. }
                | Self::CompressionNotSupported { .. }
        )
    }

    /// Returns `true` if the error comes from identifying the input format.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::FormatNotSupported { .. } | Self::UnsupportedFormat
        )
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::ArchiveError;
    /// use std::path::PathBuf;
    ///
    /// let err = ArchiveError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::ArchiveError;
    ///
    /// let err = ArchiveError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    ///
    /// let err = ArchiveError::UnsupportedFormat;
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::InvalidPattern { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
