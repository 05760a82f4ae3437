//! ZIP support backed by the `zip` crate.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::{ArchiveEntry, ArchiveReader, OpenArchive};
use crate::error::ExtractionError;

/// Reads ZIP archives from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
    fn name(&self) -> &str {
        "zip"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn OpenArchive>, ExtractionError> {
        let file = File::open(path).map_err(|e| ExtractionError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractionError::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Box::new(OpenZip {
            path: path.to_path_buf(),
            archive,
        }))
    }
}

struct OpenZip {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl OpenArchive for OpenZip {
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>, ExtractionError> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            // Raw access skips inflating the entry
            let file = self
                .archive
                .by_index_raw(index)
                .map_err(|e| ExtractionError::Entry {
                    archive: self.path.clone(),
                    index,
                    message: e.to_string(),
                })?;
            entries.push(ArchiveEntry::new(index, file.name()));
        }
        Ok(entries)
    }

    fn open_entry(&mut self, index: usize) -> Result<Box<dyn Read + '_>, ExtractionError> {
        let file = self
            .archive
            .by_index(index)
            .map_err(|e| ExtractionError::Entry {
                archive: self.path.clone(),
                index,
                message: e.to_string(),
            })?;
        Ok(Box::new(file))
    }
}
