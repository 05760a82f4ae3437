//! Pipeline orchestration: extract, enumerate, then fan out grayscale
//! transforms and join them.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::archive::ArchiveReader;
use crate::codec::ImageCodec;
use crate::config::Config;
use crate::error::{ImageError, PipelineError, PipelineResult};

use super::discovery::ImageEnumerator;
use super::extract::ArchiveExtractor;
use super::grayscale::GrayscaleTransform;

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Archive that was extracted
    pub archive: PathBuf,
    /// Directory the archive contents were written to
    pub extracted_to: PathBuf,
    /// Directory holding the grayscale images
    pub output_root: PathBuf,
    /// Number of images converted
    pub images: usize,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
}

/// Runs the archive → images → grayscale pipeline.
pub struct Pipeline {
    extractor: ArchiveExtractor,
    enumerator: ImageEnumerator,
    transform: Arc<GrayscaleTransform>,
    max_concurrent: usize,
}

impl Pipeline {
    /// Create a ZIP/PNG pipeline from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: ArchiveExtractor::zip(config.extraction.clone()),
            enumerator: ImageEnumerator::new(config.discovery.clone()),
            transform: Arc::new(GrayscaleTransform::png()),
            max_concurrent: config.transform.max_concurrent,
        }
    }

    /// Create a pipeline over custom archive and image collaborators.
    pub fn with_collaborators(
        config: &Config,
        reader: Arc<dyn ArchiveReader>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            extractor: ArchiveExtractor::new(reader, config.extraction.clone()),
            enumerator: ImageEnumerator::new(config.discovery.clone()),
            transform: Arc::new(GrayscaleTransform::new(codec)),
            max_concurrent: config.transform.max_concurrent,
        }
    }

    /// Cap the number of in-flight transforms (0 = no cap).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Extract `archive` under `extraction_root`, then write a grayscale copy
    /// of every image found at the top of the extracted tree to
    /// `output_root/<file name>`.
    ///
    /// Extraction and enumeration failures abort the run before any
    /// transform starts. Transform failures are reported only after every
    /// transform has finished; nothing written is cleaned up.
    pub async fn run(
        &self,
        archive: &Path,
        extraction_root: &Path,
        output_root: &Path,
    ) -> PipelineResult<BatchSummary> {
        let start = std::time::Instant::now();

        tracing::info!("Extracting {:?}", archive);
        self.extractor.extract(archive, extraction_root).await?;

        let extracted_to = self.extractor.unzipped_dir(extraction_root);
        let images = self.enumerator.list_images(&extracted_to).await?;
        if images.is_empty() {
            tracing::warn!("No images found in {:?}", extracted_to);
        } else {
            tracing::info!("Found {} image(s) to convert", images.len());
        }

        let converted = self.transform_all(images, output_root).await?;

        let elapsed = start.elapsed();
        tracing::info!(
            "Converted {} image(s) into {:?} in {:?}",
            converted,
            output_root,
            elapsed
        );

        Ok(BatchSummary {
            archive: archive.to_path_buf(),
            extracted_to,
            output_root: output_root.to_path_buf(),
            images: converted,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    /// Spawn one task per image and wait for all of them.
    ///
    /// Every task runs to completion regardless of sibling failures. The
    /// reported error is the first failure in enumeration order.
    async fn transform_all(
        &self,
        images: Vec<PathBuf>,
        output_root: &Path,
    ) -> PipelineResult<usize> {
        let total = images.len();
        let semaphore =
            (self.max_concurrent > 0).then(|| Arc::new(Semaphore::new(self.max_concurrent)));
        let mut handles = Vec::with_capacity(total);

        for input in images {
            let output = output_path(&input, output_root);
            let transform = self.transform.clone();
            let semaphore = semaphore.clone();
            let task_input = input.clone();

            let handle = tokio::spawn(async move {
                // A closed semaphore just means no cap
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                transform.grayscale(&task_input, &output).await
            });
            handles.push((input, handle));
        }

        let mut failed = 0usize;
        let mut first_error: Option<ImageError> = None;

        for (input, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ImageError::TaskFailed {
                    path: input.clone(),
                    message: e.to_string(),
                }),
            };

            if let Err(e) = result {
                failed += 1;
                tracing::error!("Failed: {:?} - {}", input, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(first) => Err(PipelineError::Transform {
                failed,
                total,
                first: Box::new(first),
            }),
            None => Ok(total),
        }
    }
}

/// `output_root/<file name of input>`.
fn output_path(input: &Path, output_root: &Path) -> PathBuf {
    output_root.join(input.file_name().unwrap_or(input.as_os_str()))
}
