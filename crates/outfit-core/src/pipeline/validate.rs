//! Input validation before decoding. Every check here runs before any
//! network activity.

use std::io::Read;
use std::path::Path;

use crate::config::{LimitsConfig, ProcessingConfig};
use crate::error::PipelineError;

/// Validates files before processing.
pub struct Validator {
    limits: LimitsConfig,
    supported_formats: Vec<String>,
}

impl Validator {
    /// Create a new validator with the given limits and supported formats.
    pub fn new(limits: LimitsConfig, processing: &ProcessingConfig) -> Self {
        Self {
            limits,
            supported_formats: processing.supported_formats.clone(),
        }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File extension is a supported format
    /// - File exists and is readable
    /// - File size is within limits
    /// - File has valid image magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        // Check extension
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !self
            .supported_formats
            .iter()
            .any(|fmt| fmt.to_lowercase() == ext)
        {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: if ext.is_empty() {
                    "no extension".to_string()
                } else {
                    ext
                },
            });
        }

        // Check file exists
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        // Check file size
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        // Check magic bytes
        self.check_magic_bytes(path)?;

        Ok(())
    }

    /// Check file magic bytes to verify it's a valid image format.
    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if bytes_read < 4 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !Self::is_valid_image_header(&header, bytes_read) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Check if the header bytes match a format the classifier accepts.
    fn is_valid_image_header(header: &[u8; 12], bytes_read: usize) -> bool {
        if bytes_read < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
            return true;
        }

        // GIF: GIF8
        if header[0] == b'G' && header[1] == b'I' && header[2] == b'F' && header[3] == b'8' {
            return true;
        }

        // WebP: RIFF....WEBP
        if header[0] == b'R' && header[1] == b'I' && header[2] == b'F' && header[3] == b'F' {
            if bytes_read >= 12 {
                return header[8] == b'W'
                    && header[9] == b'E'
                    && header[10] == b'B'
                    && header[11] == b'P';
            }
            // Could be WebP, allow it to proceed
            return true;
        }

        false
    }
}
