//! Classifier setup: config overrides, provider creation.

use std::path::Path;

use outfit_core::{
    Classifier, ClassifyOptions, Config, ImagePreparer, OutputFormat as CoreOutputFormat,
    VisionProviderFactory,
};

use super::types::OutputFormat;
use super::ClassifyArgs;

/// Classification context assembled by setup_classifier().
pub(crate) struct ClassifyContext {
    pub classifier: Classifier,
    pub output_format: CoreOutputFormat,
    pub pretty: bool,
}

/// Validate input, load config, and assemble everything needed to classify.
pub fn setup_classifier(args: &ClassifyArgs, input: &Path) -> anyhow::Result<ClassifyContext> {
    // Validate input path exists
    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
    }

    // Load configuration
    let mut config = Config::load()?;

    // Override batch size if specified
    if let Some(batch_size) = args.batch_size {
        if batch_size == 0 {
            anyhow::bail!("--batch-size must be > 0");
        }
        config.processing.batch_size = batch_size;
    }

    // Resolve provider: CLI flag wins over config default
    let provider_name = args
        .provider
        .map(|p| p.to_string())
        .unwrap_or_else(|| config.llm.provider.clone());

    let provider = VisionProviderFactory::create(
        &provider_name,
        &config.llm,
        &config.limits,
        args.model.as_deref(),
    )?;
    tracing::debug!("Using vision provider: {}", provider.name());

    let options = ClassifyOptions {
        batch_size: config.processing.batch_size,
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
    };
    let classifier = Classifier::new(ImagePreparer::new(&config), provider, options);

    // Resolve output format: CLI flag wins over config default
    let output_format = match args.format {
        Some(OutputFormat::Json) => CoreOutputFormat::Json,
        Some(OutputFormat::Jsonl) => CoreOutputFormat::JsonLines,
        None => {
            CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json)
        }
    };

    Ok(ClassifyContext {
        classifier,
        output_format,
        pretty: config.output.pretty,
    })
}
