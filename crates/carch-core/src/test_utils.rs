//! In-memory archive builders and fixture trees shared by unit tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;

/// Builds a tar archive of regular files with mode 0o644.
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(TarTestBuilder::new(), |builder, (path, data)| builder.add_file(path, data))
        .build()
}

/// Builds a zip archive of stored regular files with mode 0o644.
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(ZipTestBuilder::new(), |builder, (path, data)| builder.add_file(path, data))
        .build()
}

/// Writes `files` below `root`, creating parent directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

/// Tar archive builder covering the entry types the unpacker meets.
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn append(mut self, path: &str, kind: tar::EntryType, mode: u32, link: Option<&str>, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        if let Some(link) = link {
            header.set_link_name(link).unwrap();
        }
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.append(path, tar::EntryType::Regular, 0o644, None, data)
    }

    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.append(path, tar::EntryType::Directory, 0o755, None, &[])
    }

    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.append(path, tar::EntryType::Symlink, 0o777, Some(target), &[])
    }

    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.append(path, tar::EntryType::Link, 0o644, Some(target), &[])
    }

    /// Adds a regular file whose name bypasses the tar crate's path checks.
    #[must_use]
    pub fn add_raw_path(mut self, path: &str, data: &[u8]) -> Self {
        let mut header = tar::Header::new_old();
        let name = &mut header.as_old_mut().name;
        name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

/// Zip archive builder.
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode);
        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Zip stores symlinks as files whose mode carries `S_IFLNK` and whose
    /// content is the target.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        self.zip
            .add_symlink(path, target, SimpleFileOptions::default())
            .unwrap();
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tar() {
        let tar_data = create_test_tar(vec![("file.txt", b"hello")]);
        assert_eq!(&tar_data[257..262], b"ustar");
    }

    #[test]
    fn test_create_test_zip() {
        let zip_data = create_test_zip(vec![("file.txt", b"hello")]);
        assert_eq!(&zip_data[..4], &[0x50, 0x4B, 0x03, 0x04]);
    }

    #[test]
    fn test_raw_path_kept_verbatim() {
        let tar_data = TarTestBuilder::new().add_raw_path("../x", b"x").build();
        let mut archive = tar::Archive::new(&tar_data[..]);
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap(), Path::new("../x"));
    }
}
