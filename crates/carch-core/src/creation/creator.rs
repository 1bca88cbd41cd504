//! Builder for creating archives with fluent API.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::ContainerKind;
use crate::creation::config::CreationConfig;
use crate::creation::destination::CollisionPolicy;
use crate::creation::filters::FilterRules;
use crate::creation::report::CreationReport;
use crate::formats::Compression;

/// Builder for creating archives with fluent API.
///
/// # Examples
///
/// ```no_run
/// use carch_core::creation::ArchiveCreator;
///
/// let report = ArchiveCreator::new()
///     .output("backup.tar.gz")
///     .add_source("src/")
///     .add_source("Cargo.toml")
///     .compression_level(9)
///     .create()?;
///
/// println!("Created archive with {} files", report.files_added);
/// # Ok::<(), carch_core::ArchiveError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveCreator {
    output_path: Option<PathBuf>,
    sources: Vec<PathBuf>,
    config: CreationConfig,
}

impl ArchiveCreator {
    /// Creates a new `ArchiveCreator` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a source file or directory.
    #[must_use]
    pub fn add_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds several sources at once.
    #[must_use]
    pub fn sources<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        self.sources
            .extend(paths.iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: CreationConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects the container.
    #[must_use]
    pub fn container(mut self, container: ContainerKind) -> Self {
        self.config = self.config.with_container(container);
        self
    }

    /// Selects the stream compression.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.config = self.config.with_compression(compression);
        self
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config = self.config.with_compression_level(level);
        self
    }

    /// Sets the include rules.
    #[must_use]
    pub fn include(mut self, rules: FilterRules) -> Self {
        self.config = self.config.with_include(rules);
        self
    }

    /// Sets the exclude rules.
    #[must_use]
    pub fn exclude(mut self, rules: FilterRules) -> Self {
        self.config = self.config.with_exclude(rules);
        self
    }

    /// Only archives files modified after `cutoff`.
    #[must_use]
    pub fn newer_than(mut self, cutoff: SystemTime) -> Self {
        self.config = self.config.with_newer_than(Some(cutoff));
        self
    }

    /// Stores absolute source paths instead of root-relative names.
    #[must_use]
    pub fn full_path(mut self, use_full_path: bool) -> Self {
        self.config = self.config.with_full_path(use_full_path);
        self
    }

    /// Removes archived files once the archive is complete.
    #[must_use]
    pub fn delete_sources(mut self, delete: bool) -> Self {
        self.config = self.config.with_delete_sources(delete);
        self
    }

    /// Sets what happens when the output already exists.
    #[must_use]
    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.config = self.config.with_collision(policy);
        self
    }

    /// Creates the archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::DestinationRequired`] without an output
    /// path, [`ArchiveError::SourceRequired`] without sources, and
    /// otherwise the errors of [`create_archive`](crate::create_archive).
    pub fn create(self) -> Result<CreationReport> {
        let output_path = self.output_path.ok_or(ArchiveError::DestinationRequired)?;
        if self.sources.is_empty() {
            return Err(ArchiveError::SourceRequired);
        }

        crate::api::create_archive(&output_path, &self.sources, &self.config)
    }
}
