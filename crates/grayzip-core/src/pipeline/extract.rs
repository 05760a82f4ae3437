//! Archive extraction into `<root>/<unzipped_dir>/`.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::archive::{ArchiveReader, ZipArchiveReader};
use crate::config::ExtractionConfig;
use crate::error::ExtractionError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Unpacks archives entry by entry, in archive order.
///
/// Extraction is fail-fast: the first entry that cannot be opened, read,
/// or written stops the pass, and that error is returned. Whatever was
/// written before the failure stays on disk.
pub struct ArchiveExtractor {
    reader: Arc<dyn ArchiveReader>,
    config: ExtractionConfig,
}

#[derive(Debug, Default, Clone, Copy)]
struct ExtractionStats {
    directories: usize,
    files: usize,
    bytes: u64,
}

impl ArchiveExtractor {
    /// Create an extractor over any archive reader.
    pub fn new(reader: Arc<dyn ArchiveReader>, config: ExtractionConfig) -> Self {
        Self { reader, config }
    }

    /// Create an extractor for ZIP archives.
    pub fn zip(config: ExtractionConfig) -> Self {
        Self::new(Arc::new(ZipArchiveReader), config)
    }

    /// Directory that receives archive contents for a given extraction root.
    pub fn unzipped_dir(&self, destination_root: &Path) -> PathBuf {
        destination_root.join(&self.config.unzipped_dir)
    }

    /// Extract every entry of `archive_path` beneath `destination_root`.
    ///
    /// The archive reader is synchronous, so the whole pass runs on the
    /// blocking pool.
    pub async fn extract(
        &self,
        archive_path: &Path,
        destination_root: &Path,
    ) -> Result<(), ExtractionError> {
        let start = std::time::Instant::now();
        let reader = self.reader.clone();
        let archive = archive_path.to_path_buf();
        let target = self.unzipped_dir(destination_root);

        tracing::debug!(
            "Extracting {:?} ({}) into {:?}",
            archive,
            reader.name(),
            target
        );

        let stats = tokio::task::spawn_blocking(move || {
            extract_sync(reader.as_ref(), &archive, &target)
        })
        .await
        .map_err(|e| ExtractionError::TaskFailed(e.to_string()))??;

        tracing::info!(
            "Extracted {} file(s) and {} dir(s), {} bytes in {:?}",
            stats.files,
            stats.directories,
            stats.bytes,
            start.elapsed()
        );
        Ok(())
    }
}

fn extract_sync(
    reader: &dyn ArchiveReader,
    archive_path: &Path,
    target: &Path,
) -> Result<ExtractionStats, ExtractionError> {
    create_dir_all(target)?;

    let mut archive = reader.open(archive_path)?;
    let entries = archive.entries()?;
    let mut stats = ExtractionStats::default();

    for entry in entries {
        let relative = sanitize_entry_name(&entry.name)?;
        let destination = target.join(&relative);

        if entry.is_dir() {
            create_dir_all(&destination)?;
            stats.directories += 1;
            tracing::trace!("  dir  {}", entry.name);
            continue;
        }

        if relative.as_os_str().is_empty() {
            return Err(ExtractionError::UnsafePath { entry: entry.name });
        }
        if let Some(parent) = destination.parent() {
            create_dir_all(parent)?;
        }

        let mut source = archive.open_entry(entry.index)?;
        let bytes = copy_entry(&mut source, &entry.name, &destination)?;
        stats.files += 1;
        stats.bytes += bytes;
        tracing::trace!("  file {} ({} bytes)", entry.name, bytes);
    }

    Ok(stats)
}

/// Map a stored entry name to a path relative to the extraction target.
///
/// `..` steps back over the previous component. Names that would resolve
/// outside the target are rejected: absolute paths, drive prefixes, and any
/// `..` that climbs above the target itself.
fn sanitize_entry_name(name: &str) -> Result<PathBuf, ExtractionError> {
    let unsafe_path = || ExtractionError::UnsafePath {
        entry: name.to_string(),
    };

    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return Err(unsafe_path());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_path()),
        }
    }
    Ok(relative)
}

fn create_dir_all(path: &Path) -> Result<(), ExtractionError> {
    std::fs::create_dir_all(path).map_err(|source| ExtractionError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Stream one entry into a truncated file at `destination`.
fn copy_entry(
    source: &mut dyn Read,
    entry_name: &str,
    destination: &Path,
) -> Result<u64, ExtractionError> {
    let write_error = |source| ExtractionError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let mut file = File::create(destination).map_err(write_error)?;
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ExtractionError::Read {
                    entry: entry_name.to_string(),
                    source: e,
                });
            }
        };
        file.write_all(&buffer[..n]).map_err(write_error)?;
        written += n as u64;
    }

    file.flush().map_err(write_error)?;
    Ok(written)
}
