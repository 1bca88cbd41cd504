//! The collect-and-write pipeline shared by every container format.
//!
//! ```text
//! root 1 ──walk──► bounded queue 1 ──┐
//! root 2 ──walk──► bounded queue 2 ──┼──► sink ──► container ──► compression ──► file
//! root N ──walk──► bounded queue N ──┘
//! ```
//!
//! The roots are walked concurrently; the sink drains the queues in root
//! order so the same sources always produce the same entry sequence.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use crate::ArchiveError;
use crate::Result;
use crate::creation::config::CreationConfig;
use crate::creation::destination::resolve_destination;
use crate::creation::filters::PathFilter;
use crate::creation::report::CreationReport;
use crate::creation::sink;
use crate::creation::sink::ContainerWriter;
use crate::creation::sink::SharedCounters;
use crate::creation::walker::TreeCollector;

/// Result of a pipeline run: the container, ready to be finished, and the
/// source files written into it.
#[derive(Debug)]
pub struct PipelineOutcome<C> {
    /// The container after the last entry was appended.
    pub container: C,
    /// Absolute paths of the archived files.
    pub archived: Vec<PathBuf>,
}

/// Everything checked before the destination file is created.
#[derive(Debug)]
pub struct Prepared {
    /// Final destination path.
    pub destination: PathBuf,
    /// Compiled filter.
    pub filter: PathFilter,
    /// Operation start time.
    pub started: Instant,
}

/// Validates input and resolves the destination. Nothing is written.
pub fn prepare(destination: &Path, sources: &[PathBuf], config: &CreationConfig) -> Result<Prepared> {
    let started = Instant::now();
    if destination.as_os_str().is_empty() {
        return Err(ArchiveError::DestinationRequired);
    }
    if sources.is_empty() {
        return Err(ArchiveError::SourceRequired);
    }
    for source in sources {
        if let Err(e) = fs::metadata(source) {
            return Err(match e.kind() {
                ErrorKind::NotFound => ArchiveError::SourceNotFound {
                    path: source.clone(),
                },
                _ => ArchiveError::Io(e),
            });
        }
    }
    config.validate()?;
    let filter = config.path_filter()?;
    let destination = resolve_destination(destination, &config.collision, config.default_extension())?;

    Ok(Prepared {
        destination,
        filter,
        started,
    })
}

/// Runs one collector thread per source and a single sink thread draining
/// into `container`. The destination in `prepared` is never collected.
///
/// Returns after every producer has finished, the queues have closed and
/// the sink has drained them. A sink failure takes precedence over the
/// producer errors it causes.
pub fn run<C: ContainerWriter + Send>(
    container: C,
    sources: &[PathBuf],
    prepared: &Prepared,
    config: &CreationConfig,
    counters: &SharedCounters,
) -> Result<PipelineOutcome<C>> {
    let (senders, receivers): (Vec<_>, Vec<_>) = sources
        .iter()
        .map(|_| crossbeam_channel::bounded(config.queue_capacity.max(1)))
        .unzip();
    let overrides = config.overrides;
    let destination = fs::canonicalize(&prepared.destination)
        .or_else(|_| std::path::absolute(&prepared.destination))?;
    let collector = TreeCollector::new(&prepared.filter)
        .with_full_path(config.use_full_path)
        .with_excluded(&destination);

    thread::scope(|scope| {
        let sink = scope.spawn(move || {
            let mut container = container;
            let archived = sink::drain(&mut container, receivers, &overrides, counters)?;
            Ok::<_, ArchiveError>((container, archived))
        });

        let collected = collector.collect(sources, senders);
        let drained = sink
            .join()
            .map_err(|_| ArchiveError::WorkerPanicked { worker: "sink" })?;

        match (drained, collected) {
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok((container, archived)), Ok(queued)) => {
                tracing::debug!(queued, written = archived.len(), "pipeline drained");
                Ok(PipelineOutcome {
                    container,
                    archived,
                })
            }
        }
    })
}

/// Builds the report and, when configured, removes the archived files.
pub fn finalize(
    prepared: &Prepared,
    archived: &[PathBuf],
    counters: &SharedCounters,
    config: &CreationConfig,
) -> Result<CreationReport> {
    let mut report = CreationReport::from_counters(
        prepared.destination.clone(),
        counters.snapshot(),
        prepared.started.elapsed(),
    );

    if config.delete_sources {
        for path in archived {
            fs::remove_file(path)?;
            tracing::debug!(path = %path.display(), "removed archived source");
            report.sources_deleted += 1;
        }
    }

    tracing::info!(
        destination = %report.output_path.display(),
        files = report.files_added,
        bytes = report.bytes_written,
        compressed = report.bytes_compressed,
        "archive created"
    );
    Ok(report)
}
