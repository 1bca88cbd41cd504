//! Directory tree walking for archive creation.
//!
//! [`TreeCollector`] walks every source root on its own scoped thread and
//! pushes the accepted entries onto that root's bounded queue. Each root is
//! walked in file-name order, so draining the queues in root order gives
//! the same entry sequence on every run.

use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::Sender;
use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;
use crate::creation::filters::PathFilter;

/// Metadata captured when an entry is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryMetadata {
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Owner id.
    pub uid: u64,
    /// Group id.
    pub gid: u64,
    /// Modification time in seconds since the Unix epoch, clamped at 0.
    pub mtime: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl EntryMetadata {
    /// Captures the fields the container headers need.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let size = if metadata.is_dir() { 0 } else { metadata.len() };
        let (mode, uid, gid, mtime) = platform_fields(metadata);
        Self {
            size,
            mode,
            uid,
            gid,
            mtime,
            is_dir: metadata.is_dir(),
        }
    }
}

#[cfg(unix)]
fn platform_fields(metadata: &Metadata) -> (u32, u64, u64, u64) {
    use std::os::unix::fs::MetadataExt;

    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    (
        metadata.mode() & 0o7777,
        u64::from(metadata.uid()),
        u64::from(metadata.gid()),
        mtime,
    )
}

#[cfg(not(unix))]
fn platform_fields(metadata: &Metadata) -> (u32, u64, u64, u64) {
    let mode = if metadata.is_dir() { 0o755 } else { 0o644 };
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());
    (mode, 0, 0, mtime)
}

/// An accepted entry travelling from a collector to the sink.
///
/// Regular files carry their open handle; dropping the entry closes it.
#[derive(Debug)]
pub struct FileEntry {
    /// Absolute filesystem path.
    pub path: PathBuf,

    /// Path relative to the walked root.
    pub relative: PathBuf,

    /// Name stored in the archive header.
    pub archive_name: PathBuf,

    /// Metadata captured at collection time.
    pub metadata: EntryMetadata,

    /// Open handle for regular files, `None` for directories.
    pub handle: Option<File>,
}

/// Walks source roots and feeds accepted entries to the sink.
///
/// # Examples
///
/// ```no_run
/// use carch_core::creation::PathFilter;
/// use carch_core::creation::walker::TreeCollector;
/// use std::path::PathBuf;
///
/// let filter = PathFilter::accept_all();
/// let (tx, rx) = crossbeam_channel::bounded::<carch_core::creation::walker::FileEntry>(16);
/// let collector = TreeCollector::new(&filter);
///
/// let roots = vec![PathBuf::from("./project")];
/// std::thread::scope(|s| {
///     s.spawn(|| for entry in rx { println!("{}", entry.archive_name.display()); });
///     collector.collect(&roots, vec![tx]).unwrap();
/// });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TreeCollector<'a> {
    filter: &'a PathFilter,
    use_full_path: bool,
    excluded: Option<&'a Path>,
}

impl<'a> TreeCollector<'a> {
    /// Creates a collector that applies `filter` to every walked path.
    #[must_use]
    pub fn new(filter: &'a PathFilter) -> Self {
        Self {
            filter,
            use_full_path: false,
            excluded: None,
        }
    }

    /// Never collects the file at `path`, normally the archive being
    /// written. `path` must be canonical.
    #[must_use]
    pub fn with_excluded(mut self, path: &'a Path) -> Self {
        self.excluded = Some(path);
        self
    }

    /// Stores absolute paths (without the leading root) instead of paths
    /// relative to each source root.
    #[must_use]
    pub fn with_full_path(mut self, use_full_path: bool) -> Self {
        self.use_full_path = use_full_path;
        self
    }

    /// Walks every root on its own thread, pushing accepted entries onto
    /// the queue at the same position in `queues`. Blocks until all roots
    /// are done; every queue is closed when this returns.
    ///
    /// A failing root does not stop the others. Returns the number of
    /// entries queued, or the first error in root order.
    pub fn collect(&self, roots: &[PathBuf], queues: Vec<Sender<FileEntry>>) -> Result<usize> {
        debug_assert_eq!(roots.len(), queues.len(), "one queue per root");
        thread::scope(|scope| {
            let handles: Vec<_> = roots
                .iter()
                .zip(queues)
                .map(|(root, queue)| scope.spawn(move || self.walk_root(root, &queue)))
                .collect();

            let mut total = 0;
            let mut first_error = None;
            for (root, handle) in roots.iter().zip(handles) {
                match handle.join() {
                    Ok(Ok(count)) => total += count,
                    Ok(Err(e)) => {
                        tracing::error!(root = %root.display(), error = %e, "walk failed");
                        first_error.get_or_insert(e);
                    }
                    Err(_) => {
                        first_error.get_or_insert(ArchiveError::WorkerPanicked {
                            worker: "collector",
                        });
                    }
                }
            }
            first_error.map_or(Ok(total), Err)
        })
    }

    /// Walks a single root. Returns the number of entries queued.
    pub fn walk_root(&self, root: &Path, queue: &Sender<FileEntry>) -> Result<usize> {
        let root_metadata = fs::metadata(root).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ArchiveError::SourceNotFound {
                path: root.to_path_buf(),
            },
            _ => ArchiveError::Io(e),
        })?;
        let absolute = std::path::absolute(root)?;

        // A single-file root is stored under its own name.
        let (base, root_name) = if root_metadata.is_dir() {
            (absolute.clone(), absolute.file_name().map(OsStr::to_os_string))
        } else {
            let parent = absolute
                .parent()
                .map_or_else(|| absolute.clone(), Path::to_path_buf);
            (parent, None)
        };

        tracing::info!(root = %absolute.display(), "walking source root");

        let mut queued = 0;
        for entry in WalkDir::new(&absolute).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(&base) else {
                continue;
            };
            if relative.as_os_str().is_empty() {
                continue;
            }

            let metadata = entry.metadata()?;
            if metadata.is_file() && self.is_excluded(entry.path()) {
                tracing::debug!(path = %entry.path().display(), "skipping the archive being written");
                continue;
            }
            if !self.filter.accepts_metadata(&metadata) || !self.filter.include(&base, relative) {
                tracing::debug!(path = %entry.path().display(), "filtered out");
                continue;
            }

            let handle = if metadata.is_file() {
                Some(File::open(entry.path())?)
            } else if metadata.is_dir() {
                None
            } else {
                tracing::debug!(path = %entry.path().display(), "skipping special file");
                continue;
            };

            let file_entry = FileEntry {
                archive_name: archive_name(
                    root_name.as_deref(),
                    relative,
                    entry.path(),
                    self.use_full_path,
                ),
                path: entry.path().to_path_buf(),
                relative: relative.to_path_buf(),
                metadata: EntryMetadata::from_metadata(&metadata),
                handle,
            };

            queue.send(file_entry).map_err(|_| ArchiveError::QueueClosed {
                root: absolute.clone(),
            })?;
            queued += 1;
        }

        tracing::debug!(root = %absolute.display(), queued, "finished walking root");
        Ok(queued)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(excluded) = self.excluded else {
            return false;
        };
        if path.file_name() != excluded.file_name() {
            return false;
        }
        path == excluded || fs::canonicalize(path).is_ok_and(|p| p == excluded)
    }
}

/// Computes the name stored in the archive.
///
/// With `use_full_path` the absolute path is used minus its root and
/// prefix components, since containers only hold relative names. Otherwise
/// the relative path is prefixed with the root's base name when there is
/// one.
///
/// # Examples
///
/// ```
/// use carch_core::creation::walker::archive_name;
/// use std::ffi::OsStr;
/// use std::path::Path;
///
/// let name = archive_name(
///     Some(OsStr::new("test")),
///     Path::new("dir/a.txt"),
///     Path::new("/tmp/test/dir/a.txt"),
///     false,
/// );
/// assert_eq!(name, Path::new("test/dir/a.txt"));
///
/// let full = archive_name(None, Path::new("a.txt"), Path::new("/tmp/a.txt"), true);
/// assert_eq!(full, Path::new("tmp/a.txt"));
/// ```
#[must_use]
pub fn archive_name(
    root_name: Option<&OsStr>,
    relative: &Path,
    absolute: &Path,
    use_full_path: bool,
) -> PathBuf {
    if use_full_path {
        return absolute
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
    }
    root_name.map_or_else(
        || relative.to_path_buf(),
        |name| Path::new(name).join(relative),
    )
}
