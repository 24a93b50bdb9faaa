//! Core data types for the outfit classification pipeline.

use crate::taxonomy::Classification;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base64-encoded image ready to send to a vision provider.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImagePayload {
    /// Create an `ImagePayload` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        use base64::Engine;

        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A preconditioned image: validated, resized if oversized, and encoded
/// for transport. Encoding happens exactly once, here.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Dimensions of the image actually sent (post-resize if resized)
    pub width: u32,
    pub height: u32,

    /// Detected format of the source ("jpeg", "png", "webp", "gif")
    pub format: String,

    /// Source file size in bytes
    pub file_size: u64,

    /// Whether the image was downscaled before encoding
    pub resized: bool,

    /// The transport payload sent to the provider
    pub payload: ImagePayload,
}

/// Successful classification of one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedImage {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Source image width in pixels
    pub width: u32,

    /// Source image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", "gif")
    pub format: String,

    /// Whether the image was downscaled before dispatch
    pub resized: bool,

    /// The validated classification
    pub classification: Classification,

    /// Model identifier that produced the classification
    pub model: String,

    /// Round-trip latency of the provider call in milliseconds
    pub latency_ms: u64,

    /// Tokens used (input + output), if the provider reports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
}

/// A single item that failed anywhere in the chain.
///
/// Failures never abort the batch; they become one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationFailure {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Descriptive error string (format, processing, validation, or provider)
    pub error: String,
}

/// Per-image output record: exactly one per input, in input order.
/// Internally tagged: `{"status":"ok",...}` or `{"status":"error",...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutputRecord {
    Ok(Box<ClassifiedImage>),
    Error(ClassificationFailure),
}

impl OutputRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self, OutputRecord::Ok(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Category, DressCode, Season};

    fn sample_classified() -> ClassifiedImage {
        ClassifiedImage {
            file_path: PathBuf::from("/photos/coat.jpg"),
            file_name: "coat.jpg".to_string(),
            width: 512,
            height: 384,
            format: "jpeg".to_string(),
            resized: true,
            classification: Classification {
                color: "#202A44".to_string(),
                category: Category::Outer,
                dresscode: DressCode::Business,
                season: vec![Season::Fall, Season::Winter],
            },
            model: "gpt-4o-mini".to_string(),
            latency_ms: 840,
            tokens: Some(112),
        }
    }

    #[test]
    fn test_payload_from_bytes_jpeg() {
        let payload = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        assert_eq!(payload.media_type, "image/jpeg");
        assert!(!payload.data.is_empty());
    }

    #[test]
    fn test_payload_from_bytes_png() {
        let payload = ImagePayload::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "png");
        assert_eq!(payload.media_type, "image/png");
    }

    #[test]
    fn test_payload_data_url() {
        let payload = ImagePayload::from_bytes(&[1, 2, 3], "jpeg");
        assert!(payload.data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_output_record_ok_roundtrip() {
        let record = OutputRecord::Ok(Box::new(sample_classified()));
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"category\":\"outer\""));

        let parsed: OutputRecord = serde_json::from_str(&json).unwrap();
        match parsed {
            OutputRecord::Ok(img) => {
                assert_eq!(img.file_name, "coat.jpg");
                assert_eq!(img.classification.dresscode, DressCode::Business);
            }
            _ => panic!("Expected Ok variant"),
        }
    }

    #[test]
    fn test_output_record_error_roundtrip() {
        let record = OutputRecord::Error(ClassificationFailure {
            file_path: PathBuf::from("/photos/anim.gif"),
            error: "Animated image rejected".to_string(),
        });
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"status\":\"error\""));

        let parsed: OutputRecord = serde_json::from_str(&json).unwrap();
        match parsed {
            OutputRecord::Error(f) => assert!(f.error.contains("Animated")),
            _ => panic!("Expected Error variant"),
        }
    }

    #[test]
    fn test_classified_skips_none_tokens() {
        let mut img = sample_classified();
        img.tokens = None;
        let json = serde_json::to_string(&img).unwrap();
        assert!(!json.contains("tokens"));
    }
}
