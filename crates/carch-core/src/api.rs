//! High-level entry points for archive creation and extraction.

use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::creation::ContainerKind;
use crate::creation::CreationConfig;
use crate::creation::CreationReport;
use crate::formats::Archiver;
use crate::formats::TarArchiver;
use crate::formats::ZipArchiver;

pub use crate::extraction::extract_archive;

/// Returns the archiver for the container selected in `config`.
///
/// # Examples
///
/// ```
/// use carch_core::api::archiver_for;
/// use carch_core::creation::{ContainerKind, CreationConfig};
///
/// let config = CreationConfig::default().with_container(ContainerKind::Zip);
/// assert_eq!(archiver_for(&config).format_name(), "zip");
/// ```
#[must_use]
pub fn archiver_for(config: &CreationConfig) -> Box<dyn Archiver> {
    match config.container {
        ContainerKind::Tar => Box::new(TarArchiver::new(config.clone())),
        ContainerKind::Zip => Box::new(ZipArchiver::new(config.clone())),
    }
}

/// Archives `sources` into `output_path`.
///
/// # Errors
///
/// Returns validation errors before the destination is touched, then any
/// walk, read or write error raised while the archive is built.
///
/// # Examples
///
/// ```no_run
/// use carch_core::create_archive;
/// use carch_core::creation::CreationConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CreationConfig::default();
/// let report = create_archive("output.tar.gz", &["src/", "Cargo.toml"], &config)?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub fn create_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    output_path: P,
    sources: &[Q],
    config: &CreationConfig,
) -> Result<CreationReport> {
    let sources: Vec<PathBuf> = sources.iter().map(|s| s.as_ref().to_path_buf()).collect();
    archiver_for(config).create(output_path.as_ref(), &sources)
}
