//! Archive extraction: sniff the format, then run the matching
//! decompression and unpack chain.

pub mod unpack;

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use crate::ArchiveError;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::Result;
use crate::formats;
use crate::formats::Format;
use unpack::Unpacker;

/// Extracts `source` below `destination`.
///
/// The format comes from `config.format` when set, otherwise from the
/// file's magic bytes; the file name is never consulted. Entries are written
/// in stored order and the first failing entry aborts the operation,
/// leaving earlier entries on disk.
///
/// # Errors
///
/// - [`ArchiveError::SourceRequired`] / [`ArchiveError::SourceNotFound`]
/// - [`ArchiveError::NotADirectory`] if `destination` is a file
/// - [`ArchiveError::FormatNotSupported`] for recognized formats without a
///   decoder (lzw, rar, lzh, empty and spanned zip)
/// - [`ArchiveError::PathTraversal`] for entries escaping the destination
///
/// # Examples
///
/// ```no_run
/// use carch_core::{ExtractionConfig, extract_archive};
///
/// let report = extract_archive("backup.tar.gz", "restore", &ExtractionConfig::default())?;
/// println!("{} files, {} bytes", report.files_extracted, report.bytes_written);
/// # Ok::<(), carch_core::ArchiveError>(())
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    config: &ExtractionConfig,
) -> Result<ExtractionReport> {
    let started = Instant::now();
    let source = source.as_ref();
    if source.as_os_str().is_empty() {
        return Err(ArchiveError::SourceRequired);
    }
    let mut file = File::open(source).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArchiveError::SourceNotFound {
            path: source.to_path_buf(),
        },
        _ => ArchiveError::Io(e),
    })?;

    let destination = match destination.as_ref() {
        d if d.as_os_str().is_empty() => Path::new("."),
        d => d,
    };
    let format = match config.format {
        Some(format) => format,
        None => formats::detect(&mut file)?,
    };
    let target = config.target_dir(source, destination);
    prepare_target(&target)?;
    tracing::debug!(source = %source.display(), %format, target = %target.display(), "extracting");

    let mut unpacker = Unpacker::new(&target);
    let reader = BufReader::new(file);
    match format {
        Format::Tar | Format::Gzip | Format::Bzip2 | Format::Lz4 => {
            formats::tar::unpack_stream(format, reader, &mut unpacker)?;
        }
        Format::Zip => formats::zip::unpack_zip(reader, &mut unpacker)?,
        Format::Lzw | Format::Rar | Format::RarOld | Format::ZipEmpty | Format::ZipSpanned | Format::Lzh => {
            return Err(ArchiveError::FormatNotSupported { format });
        }
    }

    let mut report = unpacker.into_report();
    report.format = Some(format);
    report.duration = started.elapsed();
    tracing::info!(
        source = %source.display(),
        target = %report.destination.display(),
        files = report.files_extracted,
        bytes = report.bytes_written,
        "archive extracted"
    );
    Ok(report)
}

fn prepare_target(target: &Path) -> Result<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ArchiveError::NotADirectory {
            path: target.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(unpack::PARENT_DIR_MODE);
            }
            builder.create(target)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
