//! Vision provider trait and request/reply types.
//!
//! Defines the interface that all vision providers implement, plus the
//! factory that creates the right provider from CLI flags and config.

use crate::config::{LimitsConfig, LlmConfig};
use crate::error::PipelineError;
use crate::taxonomy::{quoted_list, Category, DressCode, Season};
use crate::types::ImagePayload;
use async_trait::async_trait;
use std::time::Duration;

/// A classification request for a single prepared image.
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    /// The image to classify
    pub image: ImagePayload,
    /// Instruction prompt naming the taxonomy
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl ClassifyRequest {
    /// Build a classification request for an image.
    ///
    /// The prompt is deterministic: it names every allowed taxonomy value
    /// and the exact JSON shape expected back.
    pub fn for_image(image: ImagePayload, max_tokens: u32, temperature: f32) -> Self {
        Self {
            image,
            prompt: classification_prompt(),
            max_tokens,
            temperature,
        }
    }
}

/// The fixed instruction prompt sent with every image.
pub fn classification_prompt() -> String {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let dresscodes: Vec<&str> = DressCode::ALL.iter().map(|d| d.as_str()).collect();
    let seasons: Vec<&str> = Season::ALL.iter().map(|s| s.as_str()).collect();

    format!(
        "Analyze the clothing item in the image and classify it according to these rules.\n\
         Return a JSON object with exactly these keys:\n\
         - \"color\": the primary color as a hex code (e.g. \"#FF0000\")\n\
         - \"category\": exactly one of [{}]\n\
         - \"dresscode\": exactly one of [{}]\n\
         - \"season\": an array of one or more of [{}]\n\
         \n\
         Respond with the JSON object only, no surrounding text.\n\
         \n\
         Example:\n\
         {{\n\
           \"color\": \"#FF0000\",\n\
           \"category\": \"outer\",\n\
           \"dresscode\": \"formal\",\n\
           \"season\": [\"fall\", \"winter\"]\n\
         }}",
        quoted_list(&categories),
        quoted_list(&dresscodes),
        quoted_list(&seasons),
    )
}

/// The raw reply from a vision provider call.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    /// Reply text, expected to be a JSON object
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Classify the image in the given request, returning the raw reply.
    async fn classify(&self, request: &ClassifyRequest) -> Result<ProviderReply, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct VisionProviderFactory;

impl VisionProviderFactory {
    /// Create a vision provider based on provider name, config, and optional
    /// model override.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("openai", "anthropic", "ollama")
    /// * `config` - The full LLM config section
    /// * `limits` - Resource limits (supplies the request timeout)
    /// * `model_override` - Optional model name that overrides the config default
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        limits: &LimitsConfig,
        model_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, PipelineError> {
        let timeout = Duration::from_millis(limits.request_timeout_ms);
        match provider {
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    PipelineError::Provider {
                        message: "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                        status_code: None,
                    }
                })?;
                let model = model_override
                    .map(String::from)
                    .unwrap_or(cfg.model.clone());
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    PipelineError::Provider {
                        message: "Anthropic API key not set. Set ANTHROPIC_API_KEY env var."
                            .to_string(),
                        status_code: None,
                    }
                })?;
                let model = model_override
                    .map(String::from)
                    .unwrap_or(cfg.model.clone());
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key, &model, timeout,
                )))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let model = model_override
                    .map(String::from)
                    .unwrap_or(cfg.model.clone());
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &model,
                    timeout,
                )))
            }
            other => Err(PipelineError::Provider {
                message: format!("Unknown vision provider: {other}"),
                status_code: None,
            }),
        }
    }
}
