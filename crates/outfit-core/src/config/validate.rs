//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "processing.batch_size must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.resize.threshold == 0 {
            return Err(ConfigError::ValidationError(
                "resize.threshold must be > 0".into(),
            ));
        }
        if self.resize.jpeg_quality == 0 || self.resize.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "resize.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "llm.max_tokens must be > 0".into(),
            ));
        }
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}
