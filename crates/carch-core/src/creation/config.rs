//! Configuration for archive creation operations.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use crate::ArchiveError;
use crate::Result;
use crate::creation::destination::CollisionPolicy;
use crate::creation::filters::FilterRules;
use crate::creation::filters::PathFilter;
use crate::creation::sink::HeaderOverrides;
use crate::formats::Compression;

/// Default capacity of the entry queue between collectors and the sink.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Container layout of the archive being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerKind {
    /// Tar stream, optionally compressed as a whole.
    #[default]
    Tar,
    /// Zip archive with per-entry compression.
    Zip,
}

impl ContainerKind {
    /// Returns the container name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContainerKind {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tar" => Ok(Self::Tar),
            "zip" => Ok(Self::Zip),
            _ => Err(ArchiveError::UnsupportedContainer { name: s.to_string() }),
        }
    }
}

/// Configuration for archive creation operations.
///
/// # Examples
///
/// ```
/// use carch_core::creation::{CreationConfig, ContainerKind, FilterRules};
/// use carch_core::formats::Compression;
///
/// let config = CreationConfig::default()
///     .with_compression(Compression::Lz4)
///     .with_exclude(FilterRules::default().with_extensions(["log"]))
///     .with_compression_level(9);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.container, ContainerKind::Tar);
/// ```
#[derive(Debug, Clone)]
pub struct CreationConfig {
    /// Container kind.
    ///
    /// Default: [`ContainerKind::Tar`].
    pub container: ContainerKind,

    /// Compression applied to a tar stream, or the zip entry method
    /// (`Gzip` selects deflate, `None` stores).
    ///
    /// Default: [`Compression::Gzip`].
    pub compression: Compression,

    /// Compression level (1-9). `None` uses the codec default.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,

    /// Owner, group and mode written into every header.
    pub overrides: HeaderOverrides,

    /// Include rules.
    pub include: FilterRules,

    /// Exclude rules.
    pub exclude: FilterRules,

    /// Only archive entries modified strictly after this instant.
    pub newer_than: Option<SystemTime>,

    /// Store absolute source paths instead of root-relative ones.
    ///
    /// Default: `false`.
    pub use_full_path: bool,

    /// Remove archived files once the archive is complete.
    ///
    /// Default: `false`.
    pub delete_sources: bool,

    /// Capacity of the entry queue.
    ///
    /// Default: [`DEFAULT_QUEUE_CAPACITY`].
    pub queue_capacity: usize,

    /// What to do when the destination exists.
    ///
    /// Default: [`CollisionPolicy::Fail`].
    pub collision: CollisionPolicy,
}

impl Default for CreationConfig {
    fn default() -> Self {
        Self {
            container: ContainerKind::Tar,
            compression: Compression::Gzip,
            compression_level: None,
            overrides: HeaderOverrides::default(),
            include: FilterRules::default(),
            exclude: FilterRules::default(),
            newer_than: None,
            use_full_path: false,
            delete_sources: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            collision: CollisionPolicy::Fail,
        }
    }
}

impl CreationConfig {
    /// Creates a new `CreationConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container kind.
    #[must_use]
    pub fn with_container(mut self, container: ContainerKind) -> Self {
        self.container = container;
        self
    }

    /// Sets the compression.
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the compression level. Checked by [`validate`](Self::validate).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets the header owner override.
    #[must_use]
    pub fn with_owner(mut self, owner: u32) -> Self {
        self.overrides.owner = owner;
        self
    }

    /// Sets the header group override.
    #[must_use]
    pub fn with_group(mut self, group: u32) -> Self {
        self.overrides.group = group;
        self
    }

    /// Sets the header mode override.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.overrides.mode = mode;
        self
    }

    /// Sets the include rules.
    #[must_use]
    pub fn with_include(mut self, rules: FilterRules) -> Self {
        self.include = rules;
        self
    }

    /// Sets the exclude rules.
    #[must_use]
    pub fn with_exclude(mut self, rules: FilterRules) -> Self {
        self.exclude = rules;
        self
    }

    /// Sets the modification time cutoff.
    #[must_use]
    pub fn with_newer_than(mut self, cutoff: Option<SystemTime>) -> Self {
        self.newer_than = cutoff;
        self
    }

    /// Sets whether to store absolute paths.
    #[must_use]
    pub fn with_full_path(mut self, use_full_path: bool) -> Self {
        self.use_full_path = use_full_path;
        self
    }

    /// Sets whether to delete archived files afterwards.
    #[must_use]
    pub fn with_delete_sources(mut self, delete: bool) -> Self {
        self.delete_sources = delete;
        self
    }

    /// Sets the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the collision policy.
    #[must_use]
    pub fn with_collision(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Selects container and compression from a target name such as `tgz`,
    /// `tar.lz4`, `tar` or `zip`.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::creation::{ContainerKind, CreationConfig};
    /// use carch_core::formats::Compression;
    ///
    /// let config = CreationConfig::default().with_target("zip").unwrap();
    /// assert_eq!(config.container, ContainerKind::Zip);
    ///
    /// let config = CreationConfig::default().with_target("tz4").unwrap();
    /// assert_eq!(config.compression, Compression::Lz4);
    /// ```
    pub fn with_target(mut self, name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("zip") {
            self.container = ContainerKind::Zip;
            return Ok(self);
        }
        self.container = ContainerKind::Tar;
        self.compression = name.parse()?;
        Ok(self)
    }

    /// Extension used when a suffixed destination name needs one.
    #[must_use]
    pub const fn default_extension(&self) -> &'static str {
        match self.container {
            ContainerKind::Tar => self.compression.extension(),
            ContainerKind::Zip => "zip",
        }
    }

    /// Compiles the include and exclude rules.
    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(&self.include, &self.exclude, self.newer_than)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is set but not in range 1-9
    /// - The compression cannot be written for the chosen container
    /// - A filter glob or the collision date format is malformed
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }

        let writable = match self.container {
            ContainerKind::Tar => self.compression.supports_creation(),
            ContainerKind::Zip => matches!(self.compression, Compression::None | Compression::Gzip),
        };
        if !writable {
            return Err(ArchiveError::CompressionNotSupported {
                name: self.compression.name(),
            });
        }

        self.path_filter()?;
        self.collision.validate()
    }
}
