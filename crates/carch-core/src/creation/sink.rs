//! The single consumer that writes queued entries into the container.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crossbeam_channel::Receiver;

use crate::ArchiveError;
use crate::Result;
use crate::creation::walker::FileEntry;

/// Owner, group and mode applied to every header. Zero keeps the value
/// taken from the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderOverrides {
    /// Owner id.
    pub owner: u32,
    /// Group id.
    pub group: u32,
    /// Permission bits.
    pub mode: u32,
}

/// Virtual file record handed to a [`ContainerWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Name stored in the archive.
    pub name: PathBuf,
    /// Content length in bytes.
    pub size: u64,
    /// Permission bits.
    pub mode: u32,
    /// Owner id.
    pub uid: u64,
    /// Group id.
    pub gid: u64,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u64,
}

impl EntryHeader {
    /// Builds a header for `entry` with `size` bytes of content.
    #[must_use]
    pub fn from_entry(entry: &FileEntry, size: u64, overrides: &HeaderOverrides) -> Self {
        let meta = &entry.metadata;
        Self {
            name: entry.archive_name.clone(),
            size,
            mode: if overrides.mode > 0 {
                overrides.mode
            } else {
                meta.mode
            },
            uid: if overrides.owner > 0 {
                u64::from(overrides.owner)
            } else {
                meta.uid
            },
            gid: if overrides.group > 0 {
                u64::from(overrides.group)
            } else {
                meta.gid
            },
            mtime: meta.mtime,
        }
    }
}

/// A container format able to append file records.
pub trait ContainerWriter {
    /// Writes one file record, reading exactly `header.size` bytes from
    /// `data`.
    fn append(&mut self, header: &EntryHeader, data: &mut dyn Read) -> Result<()>;
}

/// Running totals for one creation operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Regular files written.
    pub files: u64,
    /// Uncompressed content bytes written.
    pub bytes: u64,
    /// Bytes that reached the destination file.
    pub compressed_bytes: u64,
    /// Directory entries seen and skipped.
    pub directories_skipped: u64,
}

/// Counters shared between the sink thread and the operation that reads
/// them after the join.
#[derive(Debug, Clone, Default)]
pub struct SharedCounters(Arc<Mutex<Counters>>);

impl SharedCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut Counters)) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Records one written file of `bytes` bytes.
    pub fn record_file(&self, bytes: u64) {
        self.update(|c| {
            c.files += 1;
            c.bytes += bytes;
        });
    }

    /// Records a skipped directory.
    pub fn record_directory(&self) {
        self.update(|c| c.directories_skipped += 1);
    }

    /// Stores the final size of the destination.
    pub fn set_compressed_bytes(&self, bytes: u64) {
        self.update(|c| c.compressed_bytes = bytes);
    }

    /// Returns a copy of the current values.
    #[must_use]
    pub fn snapshot(&self) -> Counters {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drains `queues` into `container` one after the other, each until its
/// producer has hung up.
///
/// Returns the absolute paths of the files written, in write order. On the
/// first error every handle still queued is closed and every receiver is
/// dropped, so blocked producers fail instead of waiting forever.
pub fn drain<C, I>(
    container: &mut C,
    queues: I,
    overrides: &HeaderOverrides,
    counters: &SharedCounters,
) -> Result<Vec<PathBuf>>
where
    C: ContainerWriter + ?Sized,
    I: IntoIterator<Item = Receiver<FileEntry>>,
{
    let mut archived = Vec::new();
    let mut queues = queues.into_iter();
    while let Some(queue) = queues.next() {
        while let Ok(entry) = queue.recv() {
            if let Err(e) = write_entry(container, entry, overrides, counters, &mut archived) {
                tracing::error!(error = %e, "archive write failed, aborting");
                let closed = drain_and_close(queue) + queues.map(drain_and_close).sum::<usize>();
                tracing::debug!(closed, "closed queued handles");
                return Err(e);
            }
        }
    }
    Ok(archived)
}

fn write_entry<C: ContainerWriter + ?Sized>(
    container: &mut C,
    entry: FileEntry,
    overrides: &HeaderOverrides,
    counters: &SharedCounters,
    archived: &mut Vec<PathBuf>,
) -> Result<()> {
    let Some(handle) = entry.handle.as_ref() else {
        counters.record_directory();
        return Ok(());
    };

    let size = entry.metadata.size;
    let header = EntryHeader::from_entry(&entry, size, overrides);
    tracing::debug!(name = %header.name.display(), size, "appending entry");

    let mut data = handle.take(size);
    container.append(&header, &mut data)?;
    let copied = size - data.limit();
    if copied != size {
        return Err(ArchiveError::SourceChanged {
            path: entry.path,
            expected: size,
            actual: copied,
        });
    }

    counters.record_file(size);
    archived.push(entry.path);
    Ok(())
}

/// Closes every handle still sitting in the queue, then drops the receiver.
/// Returns how many entries were discarded.
pub fn drain_and_close(queue: Receiver<FileEntry>) -> usize {
    let closed = queue.try_iter().count();
    drop(queue);
    closed
}
