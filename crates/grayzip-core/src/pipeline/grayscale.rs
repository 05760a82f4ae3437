//! Grayscale conversion of a single image file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::{ImageCodec, PixelBuffer, PngCodec};
use crate::error::ImageError;

/// Set the color channels of every pixel to their mean.
///
/// `avg = (R + G + B) / 3` with integer division, so fractional means are
/// floored. Channels past the third (alpha) are left untouched.
pub fn apply_grayscale(pixels: &mut PixelBuffer) {
    for px in pixels.pixels_mut() {
        let sum = u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]);
        let avg = (sum / 3) as u8;
        px[0] = avg;
        px[1] = avg;
        px[2] = avg;
    }
}

/// Reads, converts, and writes one image.
pub struct GrayscaleTransform {
    codec: Arc<dyn ImageCodec>,
}

impl GrayscaleTransform {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        Self { codec }
    }

    /// Transform backed by [`PngCodec`].
    pub fn png() -> Self {
        Self::new(Arc::new(PngCodec))
    }

    /// Convert the image at `input` and write it to `output`.
    ///
    /// The source file is never modified; `output` is created or
    /// overwritten, along with any missing parent directories.
    pub async fn grayscale(&self, input: &Path, output: &Path) -> Result<(), ImageError> {
        if same_file(input, output).await {
            return Err(ImageError::SamePath(input.to_path_buf()));
        }

        let bytes = tokio::fs::read(input)
            .await
            .map_err(|source| ImageError::Read {
                path: input.to_path_buf(),
                source,
            })?;

        let codec = self.codec.clone();
        let input_owned = input.to_path_buf();
        let output_owned = output.to_path_buf();
        let encoded = tokio::task::spawn_blocking(move || {
            convert_bytes(codec.as_ref(), &bytes, input_owned, output_owned)
        })
        .await
        .map_err(|e| ImageError::TaskFailed {
            path: input.to_path_buf(),
            message: e.to_string(),
        })??;

        let write_error = |source| ImageError::Write {
            path: output.to_path_buf(),
            source,
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_error)?;
        }
        tokio::fs::write(output, encoded)
            .await
            .map_err(write_error)?;

        tracing::debug!(
            "Converted {:?} -> {:?} ({})",
            input,
            output,
            self.codec.name()
        );
        Ok(())
    }
}

/// Decode, convert, and re-encode (runs in spawn_blocking).
fn convert_bytes(
    codec: &dyn ImageCodec,
    bytes: &[u8],
    input: PathBuf,
    output: PathBuf,
) -> Result<Vec<u8>, ImageError> {
    let mut pixels = codec.decode(bytes).map_err(|e| ImageError::Decode {
        path: input,
        message: e.to_string(),
    })?;
    apply_grayscale(&mut pixels);
    codec.encode(&pixels).map_err(|e| ImageError::Encode {
        path: output,
        message: e.to_string(),
    })
}

/// Whether two paths name the same file, lexically or after resolution.
async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path, image: &RgbaImage) {
        image.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    fn read_png(path: &Path) -> RgbaImage {
        image::open(path).unwrap().to_rgba8()
    }

    #[test]
    fn test_apply_grayscale_averages_color_channels() {
        let mut pixels = PixelBuffer::from_rgba(1, 1, vec![30, 60, 90, 255]).unwrap();
        apply_grayscale(&mut pixels);
        assert_eq!(pixels.data(), &[60, 60, 60, 255]);
    }

    #[test]
    fn test_apply_grayscale_floors_fraction() {
        // (1 + 2 + 2) / 3 = 1.67
        let mut pixels = PixelBuffer::from_rgba(1, 1, vec![1, 2, 2, 7]).unwrap();
        apply_grayscale(&mut pixels);
        assert_eq!(pixels.data(), &[1, 1, 1, 7]);
    }

    #[test]
    fn test_apply_grayscale_no_overflow_on_white() {
        let mut pixels = PixelBuffer::from_rgba(1, 1, vec![255, 255, 255, 0]).unwrap();
        apply_grayscale(&mut pixels);
        assert_eq!(pixels.data(), &[255, 255, 255, 0]);
    }

    #[test]
    fn test_apply_grayscale_three_channels() {
        let mut pixels = PixelBuffer::new(2, 1, 3, vec![0, 3, 6, 9, 9, 9]).unwrap();
        apply_grayscale(&mut pixels);
        assert_eq!(pixels.data(), &[3, 3, 3, 9, 9, 9]);
    }

    #[tokio::test]
    async fn test_grayscale_known_pixel() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out/in.png");

        let mut source = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 128]));
        source.put_pixel(1, 0, Rgba([30, 60, 90, 255]));
        write_png(&input, &source);
        let original_bytes = std::fs::read(&input).unwrap();

        GrayscaleTransform::png()
            .grayscale(&input, &output)
            .await
            .unwrap();

        let result = read_png(&output);
        assert_eq!(result.get_pixel(1, 0), &Rgba([60, 60, 60, 255]));
        assert_eq!(result.get_pixel(0, 0), &Rgba([10, 10, 10, 128]));
        assert_eq!(std::fs::read(&input).unwrap(), original_bytes);
    }

    #[tokio::test]
    async fn test_grayscale_of_gray_image_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gray.png");
        let output = dir.path().join("gray-out.png");

        let source = RgbaImage::from_fn(8, 8, |x, y| {
            let v = (x * 30 + y) as u8;
            Rgba([v, v, v, (y * 20) as u8])
        });
        write_png(&input, &source);

        GrayscaleTransform::png()
            .grayscale(&input, &output)
            .await
            .unwrap();

        assert_eq!(read_png(&output), source);
    }

    #[tokio::test]
    async fn test_grayscale_rejects_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.png");
        write_png(&input, &RgbaImage::new(1, 1));

        let err = GrayscaleTransform::png()
            .grayscale(&input, &input)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::SamePath(_)));
    }

    #[tokio::test]
    async fn test_grayscale_corrupt_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.png");
        let output = dir.path().join("bad-out.png");
        std::fs::write(&input, b"\x89PNG but not really").unwrap();

        let err = GrayscaleTransform::png()
            .grayscale(&input, &output)
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_grayscale_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = GrayscaleTransform::png()
            .grayscale(&dir.path().join("nope.png"), &dir.path().join("out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }
}
