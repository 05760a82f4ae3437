//! Grayzip Core - unpack an archive of images and convert them to grayscale.
//!
//! # Architecture
//!
//! Grayzip is a three-stage pipeline with no state beyond the filesystem:
//!
//! ```text
//! archive.zip → Extract (<root>/unzipped/) → Enumerate (*.png) → Grayscale ×N → <output>/
//! ```
//!
//! Extraction and enumeration run once, in order. The grayscale stage spawns
//! one task per image and joins all of them before reporting.
//!
//! The archive library and the image codec sit behind the
//! [`ArchiveReader`](archive::ArchiveReader) and [`ImageCodec`](codec::ImageCodec)
//! traits; [`ZipArchiveReader`](archive::ZipArchiveReader) and
//! [`PngCodec`](codec::PngCodec) are the production implementations.
//!
//! # Usage
//!
//! ```rust,ignore
//! use grayzip_core::{Config, Pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> grayzip_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(&config);
//!
//!     let summary = pipeline
//!         .run(Path::new("photos.zip"), Path::new("work"), Path::new("gray"))
//!         .await?;
//!     println!("Converted {} image(s)", summary.images);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-exports for convenient access
pub use archive::{ArchiveEntry, ArchiveReader, OpenArchive, ZipArchiveReader};
pub use codec::{ImageCodec, PixelBuffer, PngCodec};
pub use config::Config;
pub use error::{
    CodecError, ConfigError, EnumerationError, ExtractionError, GrayzipError, ImageError,
    PipelineError, PipelineResult, Result,
};
pub use pipeline::{
    apply_grayscale, ArchiveExtractor, BatchSummary, GrayscaleTransform, ImageEnumerator,
    Pipeline,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
