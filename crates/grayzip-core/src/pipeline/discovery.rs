//! Image discovery in a single directory.

use std::path::{Path, PathBuf};

use crate::config::DiscoveryConfig;
use crate::error::EnumerationError;

/// Lists the images directly inside a directory.
#[derive(Debug, Clone)]
pub struct ImageEnumerator {
    config: DiscoveryConfig,
}

impl ImageEnumerator {
    /// Create a new enumerator with the given configuration.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// List images in `dir`, non-recursively.
    ///
    /// Returns full paths in platform directory order. An empty directory is
    /// not an error; a missing or unreadable one is.
    pub async fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, EnumerationError> {
        let read_dir_error = |source| EnumerationError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
        let mut images = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            if self.is_image(&entry.file_name().to_string_lossy()) {
                images.push(dir.join(entry.file_name()));
            }
        }

        tracing::debug!("Found {} image(s) in {:?}", images.len(), dir);
        Ok(images)
    }

    /// Case-sensitive suffix match against the configured extension.
    fn is_image(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.config.image_extension)
    }
}
