//! Zip container: writing through the creation pipeline, random-access
//! unpacking and single-entry archives built in memory.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Local;
use chrono::Timelike;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use super::Compression;
use super::Format;
use super::traits::Archiver;
use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::creation::pipeline;
use crate::creation::report::CreationReport;
use crate::creation::sink::ContainerWriter;
use crate::creation::sink::EntryHeader;
use crate::creation::sink::SharedCounters;
use crate::extraction::unpack::Unpacker;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Appends file records to a zip archive.
///
/// Zip has no owner or group fields; only the name, mode, mtime and content
/// of an [`EntryHeader`] are stored.
pub struct ZipContainer<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipContainer<W> {
    /// Starts a zip archive on `inner`.
    ///
    /// Gzip selects deflate, `None` stores entries as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CompressionNotSupported`] for bzip2 and lz4.
    pub fn new(inner: W, compression: Compression, level: Option<u8>) -> Result<Self> {
        let options = match compression {
            Compression::Gzip => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(level.map(i64::from)),
            Compression::None => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            other => {
                return Err(ArchiveError::CompressionNotSupported { name: other.name() });
            }
        };
        Ok(Self {
            zip: ZipWriter::new(inner),
            options,
        })
    }

    /// Writes the central directory and returns the inner writer.
    pub fn finish(self) -> Result<W> {
        self.zip.finish().map_err(zip_error)
    }
}

impl<W: Write + Seek> ContainerWriter for ZipContainer<W> {
    fn append(&mut self, header: &EntryHeader, data: &mut dyn Read) -> Result<()> {
        let mut options = self
            .options
            .unix_permissions(header.mode)
            .large_file(header.size >= u64::from(u32::MAX));
        if let Some(modified) = zip_time(header.mtime) {
            options = options.last_modified_time(modified);
        }

        self.zip
            .start_file(normalize_zip_path(&header.name)?, options)
            .map_err(zip_error)?;
        io::copy(data, &mut self.zip)?;
        Ok(())
    }
}

/// Creates zip archives and extracts them.
#[derive(Debug, Clone, Default)]
pub struct ZipArchiver {
    config: CreationConfig,
}

impl ZipArchiver {
    /// Creates an archiver using `config` for creation.
    #[must_use]
    pub fn new(config: CreationConfig) -> Self {
        Self { config }
    }
}

impl Archiver for ZipArchiver {
    fn create(&self, destination: &Path, sources: &[PathBuf]) -> Result<CreationReport> {
        let config = &self.config;
        let prepared = pipeline::prepare(destination, sources, config)?;
        let counters = SharedCounters::new();

        let file = File::create(&prepared.destination)?;
        let container = ZipContainer::new(BufWriter::new(file), config.compression, config.compression_level)?;

        let outcome = pipeline::run(container, sources, &prepared, config, &counters).inspect_err(|e| {
            tracing::error!(destination = %prepared.destination.display(), error = %e, "zip creation aborted");
        })?;

        let file = outcome
            .container
            .finish()?
            .into_inner()
            .map_err(|e| e.into_error())?;
        if let Err(e) = file.sync_all() {
            tracing::warn!(destination = %prepared.destination.display(), error = %e, "failed to sync archive");
        }
        counters.set_compressed_bytes(fs::metadata(&prepared.destination)?.len());

        pipeline::finalize(&prepared, &outcome.archived, &counters, config)
    }

    fn extract(&self, source: &Path, destination: &Path) -> Result<ExtractionReport> {
        crate::extract_archive(source, destination, &ExtractionConfig::new().with_format(Format::Zip))
    }

    fn format_name(&self) -> &str {
        "zip"
    }
}

/// Unpacks every entry of a zip archive in central-directory order.
pub fn unpack_zip<R: Read + Seek>(reader: R, unpacker: &mut Unpacker) -> Result<()> {
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(zip_error)?;
        let name = file.enclosed_name().ok_or_else(|| ArchiveError::PathTraversal {
            path: PathBuf::from(file.name()),
        })?;
        let Some(target) = unpacker.resolve(&name)? else {
            continue;
        };
        let mode = file.unix_mode().unwrap_or(0);

        if file.is_dir() {
            unpacker.directory(&target, mode)?;
        } else if mode & S_IFMT == S_IFLNK {
            let mut link = String::new();
            file.read_to_string(&mut link)?;
            unpacker.symlink(&target, Path::new(&link))?;
        } else {
            unpacker.file(&target, mode, &mut file)?;
        }
    }
    Ok(())
}

/// Returns an in-memory zip archive holding `data` as a single deflated
/// entry called `name`.
///
/// # Examples
///
/// ```
/// use carch_core::formats::zip::zip_bytes;
///
/// let archive = zip_bytes("hello.txt", b"hello world").unwrap();
/// assert_eq!(&archive[..4], &[0x50, 0x4B, 0x03, 0x04]);
/// ```
pub fn zip_bytes(name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    zip.start_file(name, options).map_err(zip_error)?;
    zip.write_all(data)?;
    Ok(zip.finish().map_err(zip_error)?.into_inner())
}

fn zip_error(err: ZipError) -> ArchiveError {
    match err {
        ZipError::Io(e) => ArchiveError::Io(e),
        other => ArchiveError::InvalidArchive(other.to_string()),
    }
}

/// Zip stores forward slashes only and needs UTF-8 names.
fn normalize_zip_path(path: &Path) -> Result<String> {
    let name = path.to_str().ok_or_else(|| {
        ArchiveError::Io(io::Error::other(format!(
            "path is not valid UTF-8: {}",
            path.display()
        )))
    })?;

    #[cfg(windows)]
    let name = name.replace('\\', "/");

    #[cfg(not(windows))]
    let name = name.to_string();

    Ok(name)
}

/// Converts Unix seconds to a local zip timestamp. Zip cannot represent
/// dates before 1980, those fall back to the writer's default.
fn zip_time(mtime: u64) -> Option<zip::DateTime> {
    let local = DateTime::from_timestamp(i64::try_from(mtime).ok()?, 0)?.with_timezone(&Local);
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        u8::try_from(local.month()).ok()?,
        u8::try_from(local.day()).ok()?,
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
        u8::try_from(local.second()).ok()?,
    )
    .ok()
}
