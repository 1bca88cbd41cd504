//! Archive creation operation reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::creation::sink::Counters;

/// Report of an archive creation operation.
///
/// # Examples
///
/// ```
/// use carch_core::creation::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Path the archive was written to, after collision handling.
    pub output_path: PathBuf,

    /// Number of files added to the archive.
    pub files_added: u64,

    /// Number of directory entries walked but not stored.
    pub directories_skipped: u64,

    /// Total content bytes written (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive on disk.
    pub bytes_compressed: u64,

    /// Number of source files removed after archiving.
    pub sources_deleted: u64,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a report from the final counter values.
    #[must_use]
    pub fn from_counters(output_path: PathBuf, counters: Counters, duration: Duration) -> Self {
        Self {
            output_path,
            files_added: counters.files,
            directories_skipped: counters.directories_skipped,
            bytes_written: counters.bytes,
            bytes_compressed: counters.compressed_bytes,
            duration,
            ..Self::default()
        }
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either size is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the compression percentage (space saved).
    ///
    /// Returns 0.0 if `bytes_written` is 0 and 100.0 if `bytes_compressed`
    /// is 0.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        if self.bytes_compressed == 0 {
            return 100.0;
        }
        (1.0 - self.bytes_compressed as f64 / self.bytes_written as f64) * 100.0
    }

    /// One-paragraph summary of the operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::creation::CreationReport;
    /// use std::time::Duration;
    ///
    /// let mut report = CreationReport::new();
    /// report.output_path = "out.tar.gz".into();
    /// report.files_added = 4;
    /// report.bytes_written = 76;
    /// report.duration = Duration::from_millis(1500);
    ///
    /// assert_eq!(
    ///     report.summary(),
    ///     "\"out.tar.gz\" created in 1.5000 seconds\n4 files totalling 76 bytes were processed"
    /// );
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{:?} created in {:.4} seconds\n{} files totalling {} bytes were processed",
            self.output_path.display().to_string(),
            self.duration.as_secs_f64(),
            self.files_added,
            self.bytes_written
        )
    }
}
