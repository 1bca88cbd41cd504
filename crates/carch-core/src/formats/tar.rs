//! Tar container: writing through the creation pipeline and unpacking the
//! plain, gzip, bzip2 and lz4 flavours.

use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use lz4_flex::frame::FrameDecoder;
use tar::EntryType;

use super::Format;
use super::traits::Archiver;
use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::Result;
use crate::creation::compression;
use crate::creation::config::CreationConfig;
use crate::creation::pipeline;
use crate::creation::report::CreationReport;
use crate::creation::sink::ContainerWriter;
use crate::creation::sink::EntryHeader;
use crate::creation::sink::SharedCounters;
use crate::extraction::unpack::Unpacker;
use crate::io::CountingWriter;

/// Appends regular-file records to a tar stream.
pub struct TarContainer<W: Write> {
    builder: tar::Builder<W>,
}

impl<W: Write> TarContainer<W> {
    /// Starts a tar stream on `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            builder: tar::Builder::new(inner),
        }
    }

    /// Writes the end-of-archive blocks and returns the inner writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.builder.into_inner()?)
    }
}

impl<W: Write> ContainerWriter for TarContainer<W> {
    fn append(&mut self, header: &EntryHeader, data: &mut dyn Read) -> Result<()> {
        let mut tar_header = tar::Header::new_gnu();
        tar_header.set_entry_type(EntryType::Regular);
        tar_header.set_size(header.size);
        tar_header.set_mode(header.mode);
        tar_header.set_uid(header.uid);
        tar_header.set_gid(header.gid);
        tar_header.set_mtime(header.mtime);
        self.builder.append_data(&mut tar_header, &header.name, data)?;
        Ok(())
    }
}

/// Creates and extracts tar archives with optional stream compression.
///
/// # Examples
///
/// ```no_run
/// use carch_core::creation::CreationConfig;
/// use carch_core::formats::{Archiver, Compression, TarArchiver};
/// use std::path::{Path, PathBuf};
///
/// let archiver = TarArchiver::new(CreationConfig::default().with_compression(Compression::Lz4));
/// let report = archiver.create(Path::new("site.tar.lz4"), &[PathBuf::from("public")])?;
/// println!("{}", report.summary());
/// # Ok::<(), carch_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TarArchiver {
    config: CreationConfig,
}

impl TarArchiver {
    /// Creates an archiver using `config` for creation.
    #[must_use]
    pub fn new(config: CreationConfig) -> Self {
        Self { config }
    }
}

impl Archiver for TarArchiver {
    fn create(&self, destination: &Path, sources: &[PathBuf]) -> Result<CreationReport> {
        let config = &self.config;
        let prepared = pipeline::prepare(destination, sources, config)?;
        let counters = SharedCounters::new();

        let file = File::create(&prepared.destination)?;
        let writer = compression::wrap(
            CountingWriter::new(BufWriter::new(file)),
            config.compression,
            config.compression_level,
        )?;

        let outcome = pipeline::run(TarContainer::new(writer), sources, &prepared, config, &counters)
            .inspect_err(|e| {
                tracing::error!(destination = %prepared.destination.display(), error = %e, "tar creation aborted");
            })?;

        let mut counted = outcome.container.finish()?.finish()?;
        counted.flush()?;
        counters.set_compressed_bytes(counted.total_bytes());
        let file = counted.into_inner().into_inner().map_err(|e| e.into_error())?;
        if let Err(e) = file.sync_all() {
            tracing::warn!(destination = %prepared.destination.display(), error = %e, "failed to sync archive");
        }

        pipeline::finalize(&prepared, &outcome.archived, &counters, config)
    }

    fn extract(&self, source: &Path, destination: &Path) -> Result<ExtractionReport> {
        let format = super::detect_path(source)?;
        if !matches!(format, Format::Tar | Format::Gzip | Format::Bzip2 | Format::Lz4) {
            return Err(ArchiveError::InvalidArchive(format!(
                "{} is a {format} file, not a tar stream",
                source.display()
            )));
        }
        crate::extract_archive(source, destination, &ExtractionConfig::new().with_format(format))
    }

    fn format_name(&self) -> &str {
        "tar"
    }
}

/// Decompresses `reader` per `format` and unpacks the tar stream inside.
///
/// # Errors
///
/// Returns [`ArchiveError::FormatNotSupported`] for formats that do not
/// wrap a tar stream.
pub fn unpack_stream<R: Read>(format: Format, reader: R, unpacker: &mut Unpacker) -> Result<()> {
    match format {
        Format::Tar => unpack_tar(reader, unpacker),
        Format::Gzip => unpack_tar(GzDecoder::new(reader), unpacker),
        Format::Bzip2 => unpack_tar(BzDecoder::new(reader), unpacker),
        Format::Lz4 => unpack_tar(FrameDecoder::new(reader), unpacker),
        other => Err(ArchiveError::FormatNotSupported { format: other }),
    }
}

/// Unpacks every entry of a plain tar stream in stored order.
pub fn unpack_tar<R: Read>(reader: R, unpacker: &mut Unpacker) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.into_owned();
        let kind = entry.header().entry_type();
        let mode = entry.header().mode().unwrap_or(0);

        if matches!(kind, EntryType::XGlobalHeader) {
            continue;
        }
        let Some(target) = unpacker.resolve(&name)? else {
            continue;
        };

        match kind {
            EntryType::Directory => unpacker.directory(&target, mode)?,
            EntryType::Symlink => {
                let link = entry.link_name()?.ok_or_else(|| {
                    ArchiveError::InvalidArchive(format!("symlink without target: {}", name.display()))
                })?;
                unpacker.symlink(&target, &link)?;
            }
            EntryType::Regular | EntryType::Continuous => {
                unpacker.file(&target, mode, &mut entry)?;
            }
            other => {
                return Err(ArchiveError::UnsupportedEntryType {
                    path: name,
                    type_code: other.as_byte(),
                });
            }
        }
    }
    Ok(())
}
