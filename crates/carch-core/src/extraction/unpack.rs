//! Writes archive entries below a destination directory.

use std::fs;
use std::fs::DirBuilder;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::ExtractionReport;
use crate::Result;

/// Mode used for directories created implicitly as parents of an entry.
pub const PARENT_DIR_MODE: u32 = 0o755;

/// Materializes entries of any container format and tracks the totals.
#[derive(Debug)]
pub struct Unpacker {
    root: PathBuf,
    report: ExtractionReport,
}

impl Unpacker {
    /// Creates an unpacker writing below `root`, which must already exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            report: ExtractionReport::new(root.clone()),
            root,
        }
    }

    /// Destination directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a stored entry name to its location below the root.
    ///
    /// Returns `None` for names that refer to the root itself (`.`, `./`).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathTraversal`] for absolute names and names
    /// containing `..`.
    pub fn resolve(&self, name: &Path) -> Result<Option<PathBuf>> {
        sanitize_entry_path(name).map(|relative| relative.map(|r| self.root.join(r)))
    }

    /// Creates a directory entry and applies its stored mode.
    pub fn directory(&mut self, target: &Path, mode: u32) -> Result<()> {
        self.ensure_parent(target)?;
        if !target.is_dir() {
            dir_builder().create(target)?;
        }
        set_mode(target, mode)?;
        self.report.directories_created += 1;
        tracing::debug!(path = %target.display(), "created directory");
        Ok(())
    }

    /// Creates or truncates a regular file and fills it from `data`.
    pub fn file(&mut self, target: &Path, mode: u32, data: &mut dyn Read) -> Result<u64> {
        self.ensure_parent(target)?;
        if fs::symlink_metadata(target).is_ok_and(|meta| meta.file_type().is_symlink()) {
            return Err(ArchiveError::PathTraversal {
                path: target.to_path_buf(),
            });
        }
        let mut out = File::create(target)?;
        let written = io::copy(data, &mut out)?;
        drop(out);
        set_mode(target, mode)?;
        self.report.files_extracted += 1;
        self.report.bytes_written += written;
        tracing::debug!(path = %target.display(), bytes = written, "extracted file");
        Ok(written)
    }

    /// Creates a symlink at `target` pointing to `link`.
    pub fn symlink(&mut self, target: &Path, link: &Path) -> Result<()> {
        self.ensure_parent(target)?;
        create_symlink(link, target)?;
        self.report.symlinks_created += 1;
        tracing::debug!(path = %target.display(), link = %link.display(), "created symlink");
        Ok(())
    }

    /// Consumes the unpacker and returns the totals.
    #[must_use]
    pub fn into_report(self) -> ExtractionReport {
        self.report
    }

    /// Creates the parent chain of `target`. Existing components below the
    /// root must not be symlinks, so earlier entries cannot redirect later
    /// writes outside the root.
    fn ensure_parent(&self, target: &Path) -> Result<()> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let relative = parent.strip_prefix(&self.root).unwrap_or(Path::new(""));
        let mut current = self.root.clone();
        for component in relative.components() {
            current.push(component);
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(ArchiveError::PathTraversal {
                        path: target.to_path_buf(),
                    });
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    dir_builder().create(&current)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Strips `.` components and rejects names that could escape the root.
///
/// # Examples
///
/// ```
/// use carch_core::extraction::unpack::sanitize_entry_path;
/// use std::path::{Path, PathBuf};
///
/// let clean = sanitize_entry_path(Path::new("./a/./b.txt")).unwrap();
/// assert_eq!(clean, Some(PathBuf::from("a/b.txt")));
///
/// assert_eq!(sanitize_entry_path(Path::new(".")).unwrap(), None);
/// assert!(sanitize_entry_path(Path::new("../etc/passwd")).is_err());
/// ```
pub fn sanitize_entry_path(name: &Path) -> Result<Option<PathBuf>> {
    let mut clean = PathBuf::new();
    for component in name.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => clean.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::PathTraversal {
                    path: name.to_path_buf(),
                });
            }
        }
    }
    Ok((!clean.as_os_str().is_empty()).then_some(clean))
}

fn dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PARENT_DIR_MODE);
    }
    builder
}

/// Applies the permission bits of `mode`. A zero mode keeps the default.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let bits = mode & 0o7777;
    if bits != 0 {
        fs::set_permissions(path, fs::Permissions::from_mode(bits))?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(link: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(link, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_symlink(_link: &Path, target: &Path) -> Result<()> {
    Err(ArchiveError::Io(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("symlinks are not supported here: {}", target.display()),
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_entry_path() {
        assert_eq!(
            sanitize_entry_path(Path::new("dir/file.txt")).unwrap(),
            Some(PathBuf::from("dir/file.txt"))
        );
        assert_eq!(sanitize_entry_path(Path::new("./")).unwrap(), None);
        assert!(matches!(
            sanitize_entry_path(Path::new("/etc/passwd")),
            Err(ArchiveError::PathTraversal { .. })
        ));
        assert!(matches!(
            sanitize_entry_path(Path::new("a/../../b")),
            Err(ArchiveError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let mut unpacker = Unpacker::new(temp.path());
        let target = unpacker.resolve(Path::new("a/b/c.txt")).unwrap().unwrap();

        let written = unpacker.file(&target, 0o644, &mut &b"hello"[..]).unwrap();

        assert_eq!(written, 5);
        assert_eq!(fs::read(temp.path().join("a/b/c.txt")).unwrap(), b"hello");
        let report = unpacker.into_report();
        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.bytes_written, 5);
        assert_eq!(report.directories_created, 0);
    }

    #[test]
    fn test_file_truncates_existing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("x.txt"), "much longer content").unwrap();
        let mut unpacker = Unpacker::new(temp.path());

        unpacker
            .file(&temp.path().join("x.txt"), 0, &mut &b"short"[..])
            .unwrap();
        assert_eq!(fs::read(temp.path().join("x.txt")).unwrap(), b"short");
    }

    #[test]
    fn test_directory_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut unpacker = Unpacker::new(temp.path());
        let target = temp.path().join("dir");

        unpacker.directory(&target, 0o755).unwrap();
        unpacker.directory(&target, 0o755).unwrap();

        assert!(target.is_dir());
        assert_eq!(unpacker.into_report().directories_created, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let mut unpacker = Unpacker::new(temp.path());
        let target = temp.path().join("run.sh");
        unpacker.file(&target, 0o100_750, &mut &b"#!/bin/sh"[..]).unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_parent_rejected() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let mut unpacker = Unpacker::new(temp.path());

        unpacker
            .symlink(&temp.path().join("escape"), outside.path())
            .unwrap();
        let err = unpacker
            .file(&temp.path().join("escape/owned.txt"), 0o644, &mut &b"x"[..])
            .unwrap_err();

        assert!(matches!(err, ArchiveError::PathTraversal { .. }));
        assert!(!outside.path().join("owned.txt").exists());
    }
}
