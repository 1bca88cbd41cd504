//! Extraction configuration.

use std::path::Path;
use std::path::PathBuf;

use crate::creation::destination::file_parts;
use crate::formats::Format;

/// Options for [`extract_archive`](crate::extract_archive).
///
/// # Examples
///
/// ```
/// use carch_core::ExtractionConfig;
/// use carch_core::formats::Format;
///
/// let config = ExtractionConfig::new().with_format(Format::Zip);
/// assert_eq!(config.format, Some(Format::Zip));
/// assert!(!config.create_dir);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Skip sniffing and read the archive as this format.
    pub format: Option<Format>,

    /// Extract below a directory named after the archive.
    pub create_dir: bool,
}

impl ExtractionConfig {
    /// Sniffs the format and extracts straight into the destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the archive format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Extracts below a directory named after the archive.
    #[must_use]
    pub const fn with_create_dir(mut self, create_dir: bool) -> Self {
        self.create_dir = create_dir;
        self
    }

    /// Returns the directory entries will be written below.
    ///
    /// With `create_dir` set this is `destination` joined with the archive
    /// file name minus its last extension, so `logs.zip` becomes `logs` and
    /// `logs.tar.gz` becomes `logs.tar`.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::ExtractionConfig;
    /// use std::path::Path;
    ///
    /// let config = ExtractionConfig::new().with_create_dir(true);
    /// let dir = config.target_dir(Path::new("/data/logs.zip"), Path::new("/out"));
    /// assert_eq!(dir, Path::new("/out/logs"));
    /// ```
    #[must_use]
    pub fn target_dir(&self, source: &Path, destination: &Path) -> PathBuf {
        if !self.create_dir {
            return destination.to_path_buf();
        }
        let parts = file_parts(source);
        if parts.stem.is_empty() {
            return destination.join(format!(".{}", parts.extension));
        }
        destination.join(parts.stem)
    }
}
