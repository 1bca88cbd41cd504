//! The capability shared by every container format.

use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionReport;
use crate::Result;
use crate::creation::CreationReport;

/// A container format that can both write and read archives.
pub trait Archiver {
    /// Archives `sources` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns validation errors before anything is written, and I/O or
    /// filter errors from the pipeline afterwards. A partially written
    /// destination is left on disk.
    fn create(&self, destination: &Path, sources: &[PathBuf]) -> Result<CreationReport>;

    /// Unpacks `source` below `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not this format or an entry
    /// cannot be written.
    fn extract(&self, source: &Path, destination: &Path) -> Result<ExtractionReport>;

    /// Returns the container name.
    fn format_name(&self) -> &str;
}
