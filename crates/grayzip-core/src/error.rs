//! Error types for the grayzip pipeline.
//!
//! Errors are organized by stage so a failed run names the stage, the path
//! involved, and the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for grayzip operations.
#[derive(Error, Debug)]
pub enum GrayzipError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while unpacking an archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The archive could not be opened or its central directory is unreadable
    #[error("Cannot open archive {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// An entry could not be located or opened inside the archive
    #[error("Cannot open entry #{index} in {archive}: {message}")]
    Entry {
        archive: PathBuf,
        index: usize,
        message: String,
    },

    /// The entry name would land outside the destination directory
    #[error("Refusing to extract entry with unsafe path: {entry}")]
    UnsafePath { entry: String },

    /// Decompressing an entry failed mid-stream
    #[error("Failed to read entry {entry}: {source}")]
    Read {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// Creating a directory or writing a file failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking extraction task did not run to completion
    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised while listing a directory for images.
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("Cannot list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file errors from the grayscale transform.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The source file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source bytes are not a decodable image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The transformed buffer could not be encoded
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The output file or its parent directory could not be written
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input and output resolve to the same file
    #[error("Refusing to overwrite source image in place: {0}")]
    SamePath(PathBuf),

    /// The transform task panicked or was aborted
    #[error("Transform task for {path} failed: {message}")]
    TaskFailed { path: PathBuf, message: String },
}

impl ImageError {
    /// Path of the image this error belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ImageError::Read { path, .. }
            | ImageError::Decode { path, .. }
            | ImageError::Encode { path, .. }
            | ImageError::Write { path, .. }
            | ImageError::TaskFailed { path, .. } => path,
            ImageError::SamePath(path) => path,
        }
    }
}

/// Error returned by an [`ImageCodec`](crate::codec::ImageCodec).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<image::ImageError> for CodecError {
    fn from(e: image::ImageError) -> Self {
        CodecError(e.to_string())
    }
}

/// Whole-run errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Extraction failed; no images were transformed
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The extracted directory could not be listed; no images were transformed
    #[error("Enumeration failed: {0}")]
    Enumeration(#[from] EnumerationError),

    /// At least one grayscale transform failed after the whole batch settled
    #[error("{failed} of {total} transform(s) failed, first: {first}")]
    Transform {
        failed: usize,
        total: usize,
        first: Box<ImageError>,
    },
}

/// Convenience type alias for grayzip results.
pub type Result<T> = std::result::Result<T, GrayzipError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_message_names_counts() {
        let err = PipelineError::Transform {
            failed: 1,
            total: 3,
            first: Box::new(ImageError::Decode {
                path: PathBuf::from("bad.png"),
                message: "invalid signature".to_string(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("1 of 3"));
        assert!(msg.contains("bad.png"));
    }

    #[test]
    fn test_image_error_path() {
        let err = ImageError::SamePath(PathBuf::from("a.png"));
        assert_eq!(err.path(), std::path::Path::new("a.png"));
    }
}
