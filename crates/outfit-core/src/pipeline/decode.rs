//! Image decoding with format detection, animation rejection, and timeout
//! support.

use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Original file size in bytes
    pub file_size: u64,
    /// The original file bytes, kept for pass-through encoding
    pub bytes: Vec<u8>,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode an image file with validation and timeout.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Decode an image from an in-memory byte buffer with validation and
    /// timeout. Decoding runs on the blocking pool.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<DecodedImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, path: &Path) -> Result<DecodedImage, PipelineError> {
        let file_size = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };

        // Content-based format gate: a supported extension can still hide an
        // unsupported container.
        if !matches!(
            format,
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif
        ) {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format_to_string(format),
            });
        }

        Self::reject_animated(&bytes, format, path)?;

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            file_size,
            bytes,
        })
    }

    /// Reject multi-frame GIFs and animated WebPs before full decode.
    fn reject_animated(
        bytes: &[u8],
        format: ImageFormat,
        path: &Path,
    ) -> Result<(), PipelineError> {
        match format {
            ImageFormat::Gif => {
                let decoder =
                    GifDecoder::new(Cursor::new(bytes)).map_err(|e| PipelineError::Decode {
                        path: path.to_path_buf(),
                        message: format!("Cannot read GIF: {}", e),
                    })?;
                if decoder.into_frames().take(2).count() > 1 {
                    return Err(PipelineError::Animated {
                        path: path.to_path_buf(),
                    });
                }
            }
            ImageFormat::WebP => {
                let decoder =
                    WebPDecoder::new(Cursor::new(bytes)).map_err(|e| PipelineError::Decode {
                        path: path.to_path_buf(),
                        message: format!("Cannot read WebP: {}", e),
                    })?;
                if decoder.has_animation() {
                    return Err(PipelineError::Animated {
                        path: path.to_path_buf(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn gif_bytes(frames: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buf);
            let frame_images: Vec<Frame> = (0..frames)
                .map(|i| {
                    Frame::new(RgbaImage::from_pixel(
                        4,
                        4,
                        image::Rgba([(i * 50) as u8, 0, 0, 255]),
                    ))
                })
                .collect();
            encoder.encode_frames(frame_images).unwrap();
        }
        buf
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
        assert_eq!(format_to_string(ImageFormat::Gif), "gif");
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name — format should be detected as PNG
        let result =
            ImageDecoder::decode_bytes_sync(png_bytes(4, 4), Path::new("misnamed.jpg")).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
    }

    #[test]
    fn test_unsupported_container_rejected() {
        // BMP decodes fine but is outside the supported set
        let img = DynamicImage::new_rgb8(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Bmp).unwrap();

        let err =
            ImageDecoder::decode_bytes_sync(buf.into_inner(), Path::new("sneaky.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_single_frame_gif_accepted() {
        let result =
            ImageDecoder::decode_bytes_sync(gif_bytes(1), Path::new("still.gif")).unwrap();
        assert_eq!(result.format, ImageFormat::Gif);
    }

    #[test]
    fn test_multi_frame_gif_rejected() {
        let err =
            ImageDecoder::decode_bytes_sync(gif_bytes(3), Path::new("anim.gif")).unwrap_err();
        assert!(matches!(err, PipelineError::Animated { .. }));
    }

    #[tokio::test]
    async fn test_dimension_limit_enforced() {
        let limits = LimitsConfig {
            max_image_dimension: 8,
            ..Default::default()
        };
        let decoder = ImageDecoder::new(limits);

        let err = decoder
            .decode_from_bytes(png_bytes(16, 4), Path::new("wide.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_decode_within_limits() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let decoded = decoder
            .decode_from_bytes(png_bytes(6, 9), Path::new("small.png"))
            .await
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (6, 9));
        assert!(!decoded.bytes.is_empty());
    }
}
