//! Destination path resolution and name collision handling.

use std::fmt::Write as _;
use std::path::Path;
use std::path::PathBuf;

use chrono::Local;
use chrono::format::Item;
use chrono::format::StrftimeItems;
use rand::Rng;

use crate::ArchiveError;
use crate::Result;

/// Default `strftime` pattern for date suffixes.
pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Default separator between the stem and the suffix.
pub const DEFAULT_SEPARATOR: &str = "-";

/// Default exclusive upper bound for random suffixes.
pub const DEFAULT_MAX_RAND: u32 = 10_000;

/// What to do when the destination already exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Fail with [`ArchiveError::DestinationExists`].
    #[default]
    Fail,

    /// Truncate and reuse the existing file.
    Overwrite,

    /// Append the local time formatted with `format`.
    AppendDate {
        /// `strftime` pattern.
        format: String,
        /// Text between the stem and the date.
        separator: String,
    },

    /// Append a random number below `max`.
    AppendRandom {
        /// Text between the stem and the number.
        separator: String,
        /// Exclusive upper bound.
        max: u32,
    },
}

impl CollisionPolicy {
    /// Date suffix with the default format and separator.
    #[must_use]
    pub fn append_date() -> Self {
        Self::AppendDate {
            format: DEFAULT_DATE_FORMAT.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Random suffix with the default separator and bound.
    #[must_use]
    pub fn append_random() -> Self {
        Self::AppendRandom {
            separator: DEFAULT_SEPARATOR.to_string(),
            max: DEFAULT_MAX_RAND,
        }
    }

    /// Checks the date pattern and random bound.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AppendDate { format, .. } => validate_date_format(format),
            Self::AppendRandom { max: 0, .. } => Err(ArchiveError::InvalidPattern {
                pattern: "0".to_string(),
                reason: "random suffix bound must be positive".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Parts of a destination path: directory, stem and the text after the
/// last dot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileParts {
    /// Parent directory, empty for bare names.
    pub dir: PathBuf,
    /// Name up to the last dot.
    pub stem: String,
    /// Text after the last dot, empty if there is none.
    pub extension: String,
}

/// Splits `path` into directory, stem and extension on the last dot.
///
/// # Examples
///
/// ```
/// use carch_core::creation::destination::file_parts;
/// use std::path::Path;
///
/// let parts = file_parts(Path::new("/dir/name/test.tar.gz"));
/// assert_eq!(parts.dir, Path::new("/dir/name"));
/// assert_eq!(parts.stem, "test.tar");
/// assert_eq!(parts.extension, "gz");
/// ```
#[must_use]
pub fn file_parts(path: &Path) -> FileParts {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.rsplit_once('.') {
        Some((stem, ext)) => FileParts {
            dir,
            stem: stem.to_string(),
            extension: ext.to_string(),
        },
        None => FileParts {
            dir,
            stem: name,
            extension: String::new(),
        },
    }
}

/// Picks the path the archive will be written to.
///
/// A free `path` is returned unchanged. An occupied one is handled per
/// `policy`; suffixed names fall back to `default_extension` when `path`
/// has none. The returned path is never checked again, so a concurrent
/// writer can still race the caller.
pub fn resolve_destination(
    path: &Path,
    policy: &CollisionPolicy,
    default_extension: &str,
) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ArchiveError::DestinationRequired);
    }
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let suffix = match policy {
        CollisionPolicy::Fail => {
            return Err(ArchiveError::DestinationExists {
                path: path.to_path_buf(),
            });
        }
        CollisionPolicy::Overwrite => {
            tracing::warn!(path = %path.display(), "overwriting existing destination");
            return Ok(path.to_path_buf());
        }
        CollisionPolicy::AppendDate { format, separator } => {
            validate_date_format(format)?;
            let mut stamp = String::new();
            write!(stamp, "{}", Local::now().format(format)).map_err(|_| {
                ArchiveError::InvalidPattern {
                    pattern: format.clone(),
                    reason: "date format could not be rendered".to_string(),
                }
            })?;
            format!("{separator}{stamp}")
        }
        CollisionPolicy::AppendRandom { separator, max } => {
            let n = rand::thread_rng().gen_range(0..(*max).max(1));
            format!("{separator}{n}")
        }
    };

    let parts = file_parts(path);
    let extension = if parts.extension.is_empty() {
        default_extension
    } else {
        parts.extension.as_str()
    };
    let candidate = parts.dir.join(format!("{}{suffix}.{extension}", parts.stem));

    if candidate.exists() {
        return Err(ArchiveError::DestinationExists { path: candidate });
    }
    tracing::info!(
        requested = %path.display(),
        resolved = %candidate.display(),
        "destination existed, using suffixed name"
    );
    Ok(candidate)
}

fn validate_date_format(format: &str) -> Result<()> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ArchiveError::InvalidPattern {
            pattern: format.to_string(),
            reason: "invalid date format".to_string(),
        });
    }
    Ok(())
}
