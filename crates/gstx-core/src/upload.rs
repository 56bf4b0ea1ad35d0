//! Upload validation and image preparation for the vision model.

use std::io::Cursor;
use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use tracing::debug;

use crate::error::{Result, UploadError};
use crate::models::config::ImageConfig;

/// An image re-encoded for upload to the model.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// Width after resizing.
    pub width: u32,
    /// Height after resizing.
    pub height: u32,
}

/// Check an uploaded file's name and size against the image configuration.
///
/// Returns the lowercase extension on success.
pub fn validate_upload(
    filename: Option<&str>,
    size: u64,
    config: &ImageConfig,
) -> std::result::Result<String, UploadError> {
    let filename = filename
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(UploadError::MissingName)?;

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !config.allowed_extensions.iter().any(|e| *e == extension) {
        return Err(UploadError::UnsupportedFormat(extension));
    }

    if size > config.max_file_bytes {
        return Err(UploadError::TooLarge {
            size,
            limit: config.max_file_bytes,
        });
    }

    Ok(extension)
}

/// Prepares invoice images for the vision model.
pub struct ImagePreparer {
    /// Pixel budget (width * height).
    max_pixels: u64,
    /// Contrast multiplier (1.0 = unchanged).
    contrast: f32,
}

impl ImagePreparer {
    /// Create a preparer with default settings.
    pub fn new() -> Self {
        Self::from_config(&ImageConfig::default())
    }

    /// Create a preparer from image configuration.
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            max_pixels: config.max_pixels,
            contrast: config.contrast,
        }
    }

    /// Set the pixel budget.
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Decode, normalize and re-encode an image as PNG.
    pub fn prepare(&self, bytes: &[u8]) -> Result<PreparedImage> {
        let image = image::load_from_memory(bytes)?;
        let prepared = self.prepare_image(&image);
        let (width, height) = prepared.dimensions();

        let mut encoded = Vec::new();
        prepared.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

        Ok(PreparedImage {
            bytes: encoded,
            mime_type: "image/png",
            width,
            height,
        })
    }

    /// Convert to RGB, fit within the pixel budget and boost contrast.
    pub fn prepare_image(&self, image: &DynamicImage) -> DynamicImage {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let (width, height) = rgb.dimensions();

        let resized = match self.fit_dimensions(width, height) {
            Some((new_width, new_height)) => {
                debug!(
                    "Resizing image from {}x{} to {}x{}",
                    width, height, new_width, new_height
                );
                rgb.resize_exact(new_width, new_height, FilterType::Lanczos3)
            }
            None => rgb,
        };

        if (self.contrast - 1.0).abs() > f32::EPSILON {
            resized.adjust_contrast((self.contrast - 1.0) * 100.0)
        } else {
            resized
        }
    }

    /// New dimensions when the image exceeds the pixel budget.
    fn fit_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let pixels = width as u64 * height as u64;
        if pixels <= self.max_pixels || pixels == 0 {
            return None;
        }

        let ratio = (self.max_pixels as f64 / pixels as f64).sqrt();
        let new_width = ((width as f64 * ratio) as u32).max(1);
        let new_height = ((height as f64 * ratio) as u32).max(1);
        Some((new_width, new_height))
    }
}

impl Default for ImagePreparer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_validate_upload() {
        let config = ImageConfig::default();
        assert_eq!(validate_upload(Some("Invoice.JPG"), 1024, &config), Ok("jpg".to_string()));
        assert_eq!(validate_upload(None, 1024, &config), Err(UploadError::MissingName));
        assert_eq!(validate_upload(Some("  "), 1024, &config), Err(UploadError::MissingName));
        assert_eq!(
            validate_upload(Some("invoice.pdf"), 1024, &config),
            Err(UploadError::UnsupportedFormat("pdf".to_string()))
        );
        assert_eq!(
            validate_upload(Some("scan.png"), config.max_file_bytes + 1, &config),
            Err(UploadError::TooLarge {
                size: config.max_file_bytes + 1,
                limit: config.max_file_bytes,
            })
        );
    }

    #[test]
    fn test_fit_dimensions() {
        let preparer = ImagePreparer::new().with_max_pixels(10_000);

        assert_eq!(preparer.fit_dimensions(100, 100), None);

        let (w, h) = preparer.fit_dimensions(400, 100).unwrap();
        assert!(w as u64 * h as u64 <= 10_000);
        assert_eq!(w, 200);
        assert_eq!(h, 50);
    }

    #[test]
    fn test_prepare_round_trip() {
        let mut img = RgbImage::new(64, 32);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 4) as u8, 128, 200]);
        }
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let prepared = ImagePreparer::new().with_max_pixels(512).prepare(&png).unwrap();
        assert_eq!(prepared.mime_type, "image/png");
        assert!(prepared.width as u64 * prepared.height as u64 <= 512);
        assert!(image::load_from_memory(&prepared.bytes).is_ok());
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        assert!(ImagePreparer::new().prepare(b"not an image").is_err());
    }
}
