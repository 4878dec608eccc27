use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::{debug, info, warn};

use crate::error::CompressionError;
use crate::state::image::ImageFile;

/// JPEG qualities tried in order until the output fits the byte limit
const JPEG_QUALITIES: [u8; 6] = [90, 80, 70, 60, 50, 40];

/// Each shrink pass scales both sides by this factor
const SHRINK_FACTOR: f32 = 0.8;

/// Shrinking stops once the longer side is this small
const MIN_DIMENSION_PX: u32 = 64;

/// Upper bounds for an uploaded photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLimits {
    pub max_bytes: usize,
    pub max_dimension_px: u32,
}

impl Default for CompressionLimits {
    fn default() -> Self {
        Self {
            max_bytes: 3 * 1024 * 1024,
            max_dimension_px: 1920,
        }
    }
}

/// Shrink an image to fit `limits`.
///
/// Best effort: if anything goes wrong the original file is returned
/// unchanged, so the caller can always upload something.
pub async fn compress(file: ImageFile, limits: CompressionLimits) -> ImageFile {
    let input = file.clone();

    // Spawn blocking because decoding and resizing are CPU-intensive
    let result = tokio::task::spawn_blocking(move || compress_blocking(&input, limits))
        .await
        .map_err(|e| CompressionError::Join(e.to_string()))
        .and_then(|inner| inner);

    match result {
        Ok(Some(bytes)) => {
            info!(
                "Compressed {} from {} KB to {} KB",
                file.filename,
                file.bytes.len() / 1024,
                bytes.len() / 1024
            );
            file.with_bytes(bytes)
        }
        Ok(None) => {
            debug!("{} already within limits", file.filename);
            file
        }
        Err(err) => {
            warn!("Image compression failed for {}, using original: {}", file.filename, err);
            file
        }
    }
}

/// Blocking implementation of compression.
///
/// Returns `Ok(None)` when the file should be uploaded as is.
fn compress_blocking(
    file: &ImageFile,
    limits: CompressionLimits,
) -> Result<Option<Vec<u8>>, CompressionError> {
    let format = image::guess_format(&file.bytes).map_err(CompressionError::Decode)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Ok(None);
    }

    let img = image::load_from_memory_with_format(&file.bytes, format)
        .map_err(CompressionError::Decode)?;

    let max = limits.max_dimension_px;
    let fits_dimensions = img.width() <= max && img.height() <= max;
    if fits_dimensions && file.bytes.len() <= limits.max_bytes {
        return Ok(None);
    }

    // resize() keeps the aspect ratio
    let mut img = if fits_dimensions {
        img
    } else {
        img.resize(max, max, FilterType::Lanczos3)
    };

    let mut best = encode(&img, format, limits.max_bytes)?;
    while best.len() > limits.max_bytes {
        if img.width().max(img.height()) <= MIN_DIMENSION_PX {
            debug!(
                "{} still {} bytes at {}x{}, giving up",
                file.filename,
                best.len(),
                img.width(),
                img.height()
            );
            break;
        }

        img = shrink(&img);
        let encoded = encode(&img, format, limits.max_bytes)?;
        if encoded.len() < best.len() {
            best = encoded;
        }
    }

    // Keep the original if no re-encode beat it
    if fits_dimensions && best.len() >= file.bytes.len() {
        return Ok(None);
    }

    Ok(Some(best))
}

/// Scale down by `SHRINK_FACTOR`, keeping the aspect ratio
fn shrink(img: &DynamicImage) -> DynamicImage {
    let scale = |side: u32| ((side as f32 * SHRINK_FACTOR) as u32).max(1);
    img.resize(scale(img.width()), scale(img.height()), FilterType::Lanczos3)
}

fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    max_bytes: usize,
) -> Result<Vec<u8>, CompressionError> {
    match format {
        ImageFormat::Png => encode_png(img),
        _ => encode_jpeg_within(img, max_bytes),
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CompressionError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(CompressionError::Encode)?;
    Ok(buf)
}

/// Encode as JPEG at the highest quality that fits `max_bytes`,
/// or the lowest quality tried if none does
fn encode_jpeg_within(img: &DynamicImage, max_bytes: usize) -> Result<Vec<u8>, CompressionError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut smallest = Vec::new();
    for quality in JPEG_QUALITIES {
        let mut buf = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            .map_err(CompressionError::Encode)?;

        if buf.len() <= max_bytes {
            return Ok(buf);
        }
        smallest = buf;
    }

    Ok(smallest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixel = image::Rgb([200, 40, 90]);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, pixel));
        encode_png(&img).unwrap()
    }

    /// High-entropy pixels, so neither PNG nor JPEG can squeeze them much
    fn noise(width: u32, height: u32) -> DynamicImage {
        let mut seed: u32 = 0x9E37_79B9;
        let img = RgbImage::from_fn(width, height, |_, _| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let [r, g, b, _] = seed.to_le_bytes();
            image::Rgb([r, g, b])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn noisy_png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_png(&noise(width, height)).unwrap()
    }

    fn noisy_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        noise(width, height)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 100))
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_oversized_png_is_resized() {
        let file = ImageFile::new(png_bytes(2400, 100), "image/png", "banner.png");
        let limits = CompressionLimits::default();

        let out = compress(file, limits).await;

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (1920, 80));
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        assert_eq!(out.filename, "banner.png");
        assert_eq!(out.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_small_image_is_untouched() {
        let file = ImageFile::new(png_bytes(64, 64), "image/png", "tiny.png");

        let out = compress(file.clone(), CompressionLimits::default()).await;

        assert_eq!(out, file);
    }

    #[tokio::test]
    async fn test_undecodable_image_falls_back_to_original() {
        let file = ImageFile::new(b"definitely not a png".to_vec(), "image/png", "broken.png");

        let out = compress(file.clone(), CompressionLimits::default()).await;

        assert_eq!(out.bytes, file.bytes);
    }

    #[tokio::test]
    async fn test_heavy_jpeg_is_reencoded_smaller() {
        let original = noisy_jpeg_bytes(400, 400);
        let file = ImageFile::new(original.clone(), "image/jpeg", "noise.jpg");
        let limits = CompressionLimits {
            max_bytes: original.len() / 2,
            max_dimension_px: 1920,
        };

        let out = compress(file, limits).await;

        assert!(out.bytes.len() < original.len());
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(image::load_from_memory(&out.bytes).unwrap().dimensions(), (400, 400));
    }

    #[tokio::test]
    async fn test_heavy_png_within_dimensions_is_shrunk_to_fit() {
        let original = noisy_png_bytes(400, 400);
        let file = ImageFile::new(original.clone(), "image/png", "noise.png");
        let limits = CompressionLimits {
            max_bytes: 150_000,
            max_dimension_px: 1920,
        };
        assert!(original.len() > limits.max_bytes);

        let out = compress(file, limits).await;

        assert!(out.bytes.len() <= limits.max_bytes);
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        let (width, height) = image::load_from_memory(&out.bytes).unwrap().dimensions();
        assert!(width < 400);
        assert_eq!(width, height);
    }

    #[tokio::test]
    async fn test_jpeg_too_heavy_at_lowest_quality_is_shrunk_to_fit() {
        let original = noisy_jpeg_bytes(400, 400);
        let file = ImageFile::new(original.clone(), "image/jpeg", "noise.jpg");
        let limits = CompressionLimits {
            max_bytes: original.len() / 20,
            max_dimension_px: 1920,
        };

        let out = compress(file, limits).await;

        assert!(out.bytes.len() <= limits.max_bytes);
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
        assert!(image::load_from_memory(&out.bytes).unwrap().width() < 400);
    }

    #[test]
    fn test_unreachable_limit_returns_smallest_attempt() {
        let original = noisy_png_bytes(200, 200);
        let file = ImageFile::new(original.clone(), "image/png", "noise.png");
        let limits = CompressionLimits {
            max_bytes: 16,
            max_dimension_px: 1920,
        };

        let out = compress_blocking(&file, limits).unwrap().unwrap();

        assert!(out.len() < original.len());
        let decoded = image::load_from_memory(&out).unwrap();
        assert!(decoded.width() <= MIN_DIMENSION_PX);
    }
}
