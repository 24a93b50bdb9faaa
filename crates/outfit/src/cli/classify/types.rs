//! CLI enum types for the classify command: output format and provider.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Supported vision providers.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Provider {
    /// OpenAI API
    Openai,
    /// Anthropic API
    Anthropic,
    /// Local Ollama instance
    Ollama,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Openai => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}
