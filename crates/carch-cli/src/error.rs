//! Error conversion utilities for CLI.
//!
//! Converts carch-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use carch_core::ArchiveError;
use std::path::Path;

/// Converts `ArchiveError` to a user-friendly anyhow error with context.
///
/// `path` is the archive being read or written.
pub fn convert_archive_error(err: ArchiveError, path: &Path) -> anyhow::Error {
    match err {
        ArchiveError::PathTraversal { path: entry } => {
            anyhow!(
                "Security violation: Archive '{}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                path.display(),
                entry.display()
            )
        }
        ArchiveError::DestinationExists { path: existing } => {
            anyhow!(
                "Destination already exists: {}\n\
                 HINT: Use --force, or --on-collision date|random to pick a new name.",
                existing.display()
            )
        }
        ArchiveError::SourceNotFound { path: missing } => {
            anyhow!("Source not found: {}", missing.display())
        }
        ArchiveError::FormatNotSupported { format } => {
            anyhow!(
                "Archive '{}': {format} not supported\n\
                 HINT: Supported for extraction: tar, tar.gz, tar.bz2, tar.lz4, zip",
                path.display()
            )
        }
        ArchiveError::UnsupportedFormat => {
            anyhow!(
                "Archive format not recognized: {}\n\
                 HINT: Supported for extraction: tar, tar.gz, tar.bz2, tar.lz4, zip",
                path.display()
            )
        }
        ArchiveError::UnsupportedCompression { name } => {
            anyhow!(
                "Unsupported archive type: {name}\n\
                 HINT: Use one of tar.gz, tgz, tar, tar.lz4, tz4 or zip."
            )
        }
        ArchiveError::CompressionNotSupported { name } => {
            anyhow!(
                "Cannot create '{}': {name} compression is not supported for archive creation\n\
                 HINT: Use tar.gz or tar.lz4 for tar archives; zip supports only deflate or store.",
                path.display()
            )
        }
        ArchiveError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use a level between 1 (fastest) and 9 (smallest)."
            )
        }
        ArchiveError::InvalidPattern { pattern, reason } => {
            anyhow!("Invalid pattern '{pattern}': {reason}")
        }
        ArchiveError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {}", path.display(), io_err)
        }
        ArchiveError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or malformed.",
                path.display(),
                reason
            )
        }
        ArchiveError::SourceChanged { path: ref changed, .. } => {
            anyhow!(
                "Cannot create '{}': {err}\n\
                 HINT: '{}' was modified during archiving. Retry once writes to it have stopped.",
                path.display(),
                changed.display()
            )
        }
        _ => anyhow::Error::from(err).context(format!("Error processing archive '{}'", path.display())),
    }
}

/// Adds archive context to a core result.
pub fn add_archive_context<T>(result: Result<T, ArchiveError>, path: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carch_core::Format;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = ArchiveError::PathTraversal {
            path: PathBuf::from("../../../etc/passwd"),
        };
        let converted = convert_archive_error(err, Path::new("malicious.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("path traversal"));
        assert!(msg.contains("malicious.zip"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_format_not_supported() {
        let err = ArchiveError::FormatNotSupported { format: Format::Rar };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("a.rar")));
        assert!(msg.contains("rar post 5.0 not supported"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_destination_exists() {
        let err = ArchiveError::DestinationExists {
            path: PathBuf::from("out.tar.gz"),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("out.tar.gz")));
        assert!(msg.contains("--on-collision"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ArchiveError::Io(io_err);
        let converted = convert_archive_error(err, Path::new("archive.tar.gz"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_convert_source_changed() {
        let err = ArchiveError::SourceChanged {
            path: PathBuf::from("logs/app.log"),
            expected: 10,
            actual: 4,
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("out.tar")));
        assert!(msg.contains("expected 10 bytes, read 4"));
        assert!(msg.contains("HINT: 'logs/app.log' was modified"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let err = ArchiveError::WorkerPanicked { worker: "sink" };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("x.tar")));
        assert!(msg.contains("Error processing archive 'x.tar'"));
        assert!(msg.contains("sink thread panicked"));
    }
}
