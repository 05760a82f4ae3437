//! Pipeline stages.
//!
//! - **extract**: Unpack an archive into `<root>/unzipped/`
//! - **discovery**: List the images at the top of a directory
//! - **grayscale**: Convert one image to grayscale
//! - **coordinator**: Run the stages in order and join the fan-out

pub mod coordinator;
pub mod discovery;
pub mod extract;
pub mod grayscale;

// Re-exports for convenient access
pub use coordinator::{BatchSummary, Pipeline};
pub use discovery::ImageEnumerator;
pub use extract::ArchiveExtractor;
pub use grayscale::{apply_grayscale, GrayscaleTransform};
