//! Size normalization and transport encoding.
//!
//! Oversized images are downscaled so the longer side lands on the
//! configured threshold, then re-encoded as JPEG. Everything else passes
//! through with its original bytes. Either way the result is base64-encoded
//! exactly once.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

use crate::config::ResizeConfig;
use crate::error::PipelineError;
use crate::pipeline::decode::{format_to_string, DecodedImage};
use crate::types::ImagePayload;

/// Normalizes image size and produces the transport payload.
pub struct Preconditioner {
    config: ResizeConfig,
}

/// The encoded transport form of an image, plus what was sent.
pub struct Preconditioned {
    /// Base64 payload handed to the provider
    pub payload: ImagePayload,
    /// Width of the image actually encoded
    pub width: u32,
    /// Height of the image actually encoded
    pub height: u32,
    /// Whether a downscale happened
    pub resized: bool,
}

impl Preconditioner {
    /// Create a new preconditioner with the given resize settings.
    pub fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    /// Check whether the longer side exceeds the threshold.
    pub fn should_resize(&self, width: u32, height: u32) -> bool {
        width.max(height) > self.config.threshold
    }

    /// Produce the transport payload for a decoded image.
    ///
    /// Oversized images are resized preserving aspect ratio (longer side
    /// clamped to the threshold) and re-encoded as JPEG; others keep their
    /// original bytes and media type.
    pub fn encode(
        &self,
        decoded: &DecodedImage,
        path: &Path,
    ) -> Result<Preconditioned, PipelineError> {
        if !self.should_resize(decoded.width, decoded.height) {
            return Ok(Preconditioned {
                payload: ImagePayload::from_bytes(&decoded.bytes, &format_to_string(decoded.format)),
                width: decoded.width,
                height: decoded.height,
                resized: false,
            });
        }

        let longer = decoded.width.max(decoded.height);
        let ratio = self.config.threshold as f64 / longer as f64;
        let new_width = ((decoded.width as f64 * ratio).round() as u32).max(1);
        let new_height = ((decoded.height as f64 * ratio).round() as u32).max(1);

        tracing::debug!(
            "Resizing {:?}: {}x{} -> {}x{}",
            path.file_name().unwrap_or_default(),
            decoded.width,
            decoded.height,
            new_width,
            new_height
        );

        let small = decoded
            .image
            .resize_exact(new_width, new_height, FilterType::Lanczos3);

        // JPEG has no alpha channel; flatten before encoding
        let rgb = DynamicImage::ImageRgb8(small.to_rgb8());
        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: format!("JPEG re-encode failed: {}", e),
            })?;

        Ok(Preconditioned {
            payload: ImagePayload::from_bytes(&buffer.into_inner(), "jpeg"),
            width: new_width,
            height: new_height,
            resized: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use image::{GenericImageView, ImageFormat};

    fn decoded_png(width: u32, height: u32) -> DecodedImage {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let bytes = buf.into_inner();
        DecodedImage {
            file_size: bytes.len() as u64,
            image: img,
            format: ImageFormat::Png,
            width,
            height,
            bytes,
        }
    }

    fn decode_payload(payload: &ImagePayload) -> DynamicImage {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&payload.data)
            .unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_small_image_passes_through() {
        let pre = Preconditioner::new(ResizeConfig::default());
        let decoded = decoded_png(300, 200);
        let out = pre.encode(&decoded, Path::new("small.png")).unwrap();

        assert!(!out.resized);
        assert_eq!((out.width, out.height), (300, 200));
        assert_eq!(out.payload.media_type, "image/png");
        // Pass-through keeps the original bytes verbatim
        let original = base64::engine::general_purpose::STANDARD.encode(&decoded.bytes);
        assert_eq!(out.payload.data, original);
    }

    #[test]
    fn test_landscape_resize_preserves_aspect() {
        let pre = Preconditioner::new(ResizeConfig::default());
        let decoded = decoded_png(1024, 768);
        let out = pre.encode(&decoded, Path::new("wide.png")).unwrap();

        assert!(out.resized);
        assert_eq!((out.width, out.height), (512, 384));
        assert_eq!(out.payload.media_type, "image/jpeg");

        let img = decode_payload(&out.payload);
        assert_eq!(img.dimensions(), (512, 384));
    }

    #[test]
    fn test_portrait_resize_clamps_longer_side() {
        let pre = Preconditioner::new(ResizeConfig::default());
        let decoded = decoded_png(600, 1200);
        let out = pre.encode(&decoded, Path::new("tall.png")).unwrap();

        assert!(out.resized);
        assert_eq!((out.width, out.height), (256, 512));
    }

    #[test]
    fn test_resize_rounds_within_one_pixel() {
        let pre = Preconditioner::new(ResizeConfig::default());
        // 1000x777 -> ratio 0.512 -> 512x397.8 rounds to 512x398
        let decoded = decoded_png(1000, 777);
        let out = pre.encode(&decoded, Path::new("odd.png")).unwrap();

        assert_eq!(out.width, 512);
        let expected = (777.0f64 * 512.0 / 1000.0).round() as u32;
        assert_eq!(out.height, expected);
    }

    #[test]
    fn test_extreme_aspect_never_hits_zero() {
        let pre = Preconditioner::new(ResizeConfig::default());
        let decoded = decoded_png(2000, 2);
        let out = pre.encode(&decoded, Path::new("ribbon.png")).unwrap();

        assert_eq!(out.width, 512);
        assert!(out.height >= 1);
    }

    #[test]
    fn test_exactly_threshold_not_resized() {
        let pre = Preconditioner::new(ResizeConfig::default());
        let decoded = decoded_png(512, 100);
        let out = pre.encode(&decoded, Path::new("edge.png")).unwrap();
        assert!(!out.resized);
    }
}
