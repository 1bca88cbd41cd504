//! Path filtering logic for archive creation.
//!
//! A [`PathFilter`] holds two independent rule sets. The include set is
//! checked first; the exclude set is consulted only for candidates that
//! passed it.

use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use globset::Glob;
use globset::GlobMatcher;

use crate::ArchiveError;
use crate::Result;

/// One set of inclusion or exclusion rules.
///
/// # Examples
///
/// ```
/// use carch_core::creation::FilterRules;
///
/// let rules = FilterRules::default()
///     .with_extensions(["txt", "md"])
///     .with_glob("*/docs/*");
/// assert!(!rules.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    /// Exact base names.
    pub names: Vec<String>,

    /// File extensions, with or without the leading dot.
    pub extensions: Vec<String>,

    /// Base-name prefix rule.
    pub anchored: Option<String>,

    /// Glob matched against the root joined with the candidate path.
    pub glob: Option<String>,
}

impl FilterRules {
    /// Adds exact base names.
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds extensions. A leading dot is ignored.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(
            extensions
                .into_iter()
                .map(Into::into)
                .map(|ext: String| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty()),
        );
        self
    }

    /// Sets the anchored rule.
    #[must_use]
    pub fn with_anchored(mut self, anchored: impl Into<String>) -> Self {
        self.anchored = Some(anchored.into());
        self
    }

    /// Sets the glob pattern.
    #[must_use]
    pub fn with_glob(mut self, glob: impl Into<String>) -> Self {
        self.glob = Some(glob.into());
        self
    }

    /// Returns `true` if no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.extensions.is_empty()
            && self.anchored.as_deref().is_none_or(str::is_empty)
            && self.glob.as_deref().is_none_or(str::is_empty)
    }
}

/// Rule set with its glob compiled.
#[derive(Debug, Clone)]
struct CompiledRules {
    rules: FilterRules,
    glob: Option<GlobMatcher>,
}

impl CompiledRules {
    fn compile(rules: &FilterRules) -> Result<Self> {
        let glob = match rules.glob.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(
                Glob::new(pattern)
                    .map_err(|e| ArchiveError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.kind().to_string(),
                    })?
                    .compile_matcher(),
            ),
            _ => None,
        };
        Ok(Self {
            rules: rules.clone(),
            glob,
        })
    }

    fn anchored(&self) -> Option<&str> {
        self.rules.anchored.as_deref().filter(|a| !a.is_empty())
    }

    fn glob_matches(&self, root: &Path, candidate: &Path) -> bool {
        self.glob
            .as_ref()
            .is_some_and(|glob| glob.is_match(root.join(candidate)))
    }

    fn name_matches(&self, base: &str) -> bool {
        self.rules.names.iter().any(|name| name == base)
    }

    fn extension_matches(&self, base: &str) -> bool {
        self.rules
            .extensions
            .iter()
            .any(|ext| has_extension(base, ext))
    }
}

/// Decides which walked paths end up in the archive.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: CompiledRules,
    exclude: CompiledRules,
    newer_than: Option<SystemTime>,
}

impl PathFilter {
    /// Compiles include and exclude rules.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidPattern`] if either glob fails to
    /// compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use carch_core::creation::{FilterRules, PathFilter};
    /// use std::path::Path;
    ///
    /// let include = FilterRules::default().with_extensions(["txt"]);
    /// let exclude = FilterRules::default().with_extensions(["log"]);
    /// let filter = PathFilter::new(&include, &exclude, None).unwrap();
    ///
    /// let root = Path::new("/data");
    /// assert!(filter.include(root, Path::new("a.txt")));
    /// assert!(!filter.include(root, Path::new("a.log")));
    /// assert!(filter.include(root, Path::new("a.log.txt")));
    /// ```
    pub fn new(
        include: &FilterRules,
        exclude: &FilterRules,
        newer_than: Option<SystemTime>,
    ) -> Result<Self> {
        Ok(Self {
            include: CompiledRules::compile(include)?,
            exclude: CompiledRules::compile(exclude)?,
            newer_than,
        })
    }

    /// Filter that accepts every regular file and directory.
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            include: CompiledRules {
                rules: FilterRules::default(),
                glob: None,
            },
            exclude: CompiledRules {
                rules: FilterRules::default(),
                glob: None,
            },
            newer_than: None,
        }
    }

    /// Returns `true` if `candidate`, relative to `root`, belongs in the
    /// archive.
    ///
    /// When the anchored include rule is what admitted the candidate, the
    /// anchored exclude rule is not applied to it; every other exclude rule
    /// still vetoes.
    #[must_use]
    pub fn include(&self, root: &Path, candidate: &Path) -> bool {
        if candidate.as_os_str().is_empty() || root.join(candidate) == root {
            return false;
        }
        let base = base_name(candidate);

        match self.include_match(root, candidate, &base) {
            None => false,
            Some(matched) => !self.is_excluded(root, candidate, &base, matched),
        }
    }

    /// Metadata-level checks: symlinks are never archived, and with a
    /// `newer_than` cutoff only strictly newer entries pass.
    #[must_use]
    pub fn accepts_metadata(&self, metadata: &Metadata) -> bool {
        if metadata.file_type().is_symlink() {
            return false;
        }
        match (self.newer_than, metadata.modified()) {
            (None, _) => true,
            (Some(cutoff), Ok(mtime)) => mtime > cutoff,
            (Some(_), Err(_)) => false,
        }
    }

    fn include_match(&self, root: &Path, candidate: &Path, base: &str) -> Option<IncludeMatch> {
        let rules = &self.include;
        if rules.rules.is_empty() {
            return Some(IncludeMatch::Default);
        }

        // The candidate's base name must be a prefix of the anchor's base name.
        if let Some(anchored) = rules.anchored()
            && base_name(Path::new(anchored)).starts_with(base)
        {
            return Some(IncludeMatch::Anchored);
        }
        if rules.glob_matches(root, candidate)
            || rules.name_matches(base)
            || rules.extension_matches(base)
        {
            return Some(IncludeMatch::Rule);
        }
        None
    }

    fn is_excluded(
        &self,
        root: &Path,
        candidate: &Path,
        base: &str,
        matched: IncludeMatch,
    ) -> bool {
        let rules = &self.exclude;
        if matched != IncludeMatch::Anchored
            && let Some(anchored) = rules.anchored()
            && base.starts_with(anchored)
        {
            return true;
        }
        rules.glob_matches(root, candidate)
            || rules.name_matches(base)
            || rules.extension_matches(base)
    }
}

/// Which include rule admitted a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncludeMatch {
    Default,
    Anchored,
    Rule,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

/// Returns `true` if `name` ends with `.ext`.
///
/// # Examples
///
/// ```
/// use carch_core::creation::filters::has_extension;
///
/// assert!(has_extension("a.log.txt", "txt"));
/// assert!(!has_extension("a.log.txt", "log"));
/// assert!(!has_extension("txt", "txt"));
/// ```
#[must_use]
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.strip_suffix(ext)
        .is_some_and(|stem| stem.ends_with('.'))
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
