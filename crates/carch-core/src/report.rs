//! Extraction operation reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::formats::Format;

/// Report of an archive extraction operation.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Directory the entries were written below.
    pub destination: PathBuf,

    /// Format the archive was read as, if any entry was read.
    pub format: Option<Format>,

    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Number of symlinks created.
    pub symlinks_created: usize,

    /// Total content bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the extraction operation.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates an empty report for `destination`.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Returns total number of entries materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.symlinks_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = ExtractionReport::new("/tmp/out");
        assert_eq!(report.destination, PathBuf::from("/tmp/out"));
        assert_eq!(report.files_extracted, 0);
        assert_eq!(report.bytes_written, 0);
        assert!(report.format.is_none());
    }

    #[test]
    fn test_total_items() {
        let report = ExtractionReport {
            files_extracted: 10,
            directories_created: 5,
            symlinks_created: 2,
            ..ExtractionReport::default()
        };
        assert_eq!(report.total_items(), 17);
    }
}
