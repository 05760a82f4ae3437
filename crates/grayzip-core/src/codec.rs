//! Image codec collaborator and the decoded pixel buffer it produces.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use crate::error::CodecError;

/// Decoded image data with an explicit interleaved channel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Channels per pixel in the RGBA8 layout produced by [`PngCodec`].
    pub const RGBA_CHANNELS: usize = 4;

    /// Wrap raw interleaved bytes.
    ///
    /// The first three channels of each pixel are treated as color and any
    /// further channel as alpha, so at least three channels are required.
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        if channels < 3 {
            return Err(CodecError(format!(
                "pixel buffer needs at least 3 channels, got {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(CodecError(format!(
                "pixel buffer of {width}x{height}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap RGBA8 bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CodecError> {
        Self::new(width, height, Self::RGBA_CHANNELS, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of one pixel per chunk.
    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(self.channels)
    }

    /// Channel values of the pixel at (`x`, `y`), if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * self.channels;
        self.data.get(start..start + self.channels)
    }
}

/// Decodes and encodes one image format.
///
/// Implementations are called from blocking threads and shared across
/// concurrent transforms.
pub trait ImageCodec: Send + Sync {
    /// Format name for logging (e.g. "png").
    fn name(&self) -> &str;

    /// Decode encoded bytes into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError>;

    /// Encode a pixel buffer back into the same format.
    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError>;
}

/// PNG codec backed by the `image` crate.
///
/// Every input is decoded to RGBA8: RGB and gray inputs gain channels, and
/// 16-bit inputs are scaled down to 8 bits per channel, so outputs are always
/// 8-bit RGBA PNGs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn name(&self) -> &str {
        "png"
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
        let (width, height) = image.dimensions();
        PixelBuffer::from_rgba(width, height, image.into_raw())
    }

    fn encode(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        if pixels.channels() != PixelBuffer::RGBA_CHANNELS {
            return Err(CodecError(format!(
                "png encoder expects RGBA8 input, got {} channels",
                pixels.channels()
            )));
        }

        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer).write_image(
            pixels.data(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(buffer)
    }
}
