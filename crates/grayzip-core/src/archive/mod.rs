//! Archive-reading collaborator.
//!
//! The extractor only needs three capabilities from an archive library: open
//! an archive by path, list its entries in stored order, and open a
//! decompressing reader for one entry. They live behind [`ArchiveReader`] and
//! [`OpenArchive`] so extraction can be exercised against in-memory fakes.

mod zip_reader;

pub use zip_reader::ZipArchiveReader;

use std::io::Read;
use std::path::Path;

use crate::error::ExtractionError;

/// One member of an archive, as listed from its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position of the entry in archive order
    pub index: usize,
    /// Stored name, `/`-separated, relative to the archive root
    pub name: String,
}

impl ArchiveEntry {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Directory markers are stored with a trailing separator.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Opens archives for sequential reading.
pub trait ArchiveReader: Send + Sync {
    /// Format name for logging (e.g. "zip").
    fn name(&self) -> &str;

    /// Open the archive at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn OpenArchive>, ExtractionError>;
}

/// An archive handle returned by [`ArchiveReader::open`].
pub trait OpenArchive {
    /// List every entry in archive order.
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>, ExtractionError>;

    /// Open a reader yielding the decompressed bytes of entry `index`.
    fn open_entry(&mut self, index: usize) -> Result<Box<dyn Read + '_>, ExtractionError>;
}
