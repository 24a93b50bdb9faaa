//! Precondition orchestration - wires together validation, decoding, and
//! encoding. Everything here runs before any network call.

use std::path::Path;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::PreparedImage;

use super::decode::{format_to_string, ImageDecoder};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::precondition::Preconditioner;
use super::validate::Validator;

/// Prepares images for classification: validate, decode, normalize, encode.
pub struct ImagePreparer {
    validator: Validator,
    decoder: ImageDecoder,
    preconditioner: Preconditioner,
    discovery: FileDiscovery,
}

impl ImagePreparer {
    /// Create a new preparer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            validator: Validator::new(config.limits.clone(), &config.processing),
            decoder: ImageDecoder::new(config.limits.clone()),
            preconditioner: Preconditioner::new(config.resize.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
        }
    }

    /// Run the full precondition chain for a single file.
    pub async fn prepare(&self, path: &Path) -> Result<PreparedImage, PipelineError> {
        let start = std::time::Instant::now();
        tracing::debug!("Preparing: {:?}", path);

        self.validator.validate(path)?;

        let decoded = self.decoder.decode(path).await?;
        tracing::trace!("  Decoded {}x{}", decoded.width, decoded.height);

        let encoded = self.preconditioner.encode(&decoded, path)?;
        tracing::trace!(
            "  Encoded ({} base64 bytes{})",
            encoded.payload.data.len(),
            if encoded.resized { ", resized" } else { "" }
        );

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!("Prepared {:?} in {:?}", file_name, start.elapsed());

        Ok(PreparedImage {
            file_path: path.to_path_buf(),
            file_name,
            width: encoded.width,
            height: encoded.height,
            format: format_to_string(decoded.format),
            file_size: decoded.file_size,
            resized: encoded.resized,
            payload: encoded.payload,
        })
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, buf.into_inner()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_prepare_small_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "shirt.png", 100, 80);

        let preparer = ImagePreparer::new(&Config::default());
        let prepared = preparer.prepare(&path).await.unwrap();

        assert_eq!(prepared.file_name, "shirt.png");
        assert_eq!(prepared.format, "png");
        assert!(!prepared.resized);
        assert_eq!((prepared.width, prepared.height), (100, 80));
        assert!(!prepared.payload.data.is_empty());
    }

    #[tokio::test]
    async fn test_prepare_resizes_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "big.png", 1024, 512);

        let preparer = ImagePreparer::new(&Config::default());
        let prepared = preparer.prepare(&path).await.unwrap();

        assert!(prepared.resized);
        assert_eq!((prepared.width, prepared.height), (512, 256));
        assert_eq!(prepared.payload.media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_prepare_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();

        let preparer = ImagePreparer::new(&Config::default());
        let err = preparer.prepare(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }
}
