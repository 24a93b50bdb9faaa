//! Outfit Core - Embeddable clothing classification library.
//!
//! Outfit delegates visual understanding of clothing images to a multimodal
//! vision provider and validates what comes back against a fixed taxonomy
//! (color, category, dress code, season).
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Decode → Resize/Encode → Provider call → Taxonomy check → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use outfit_core::{Classifier, ClassifyOptions, Config, ImagePreparer, VisionProviderFactory};
//!
//! #[tokio::main]
//! async fn main() -> outfit_core::Result<()> {
//!     let config = Config::load()?;
//!     let provider = VisionProviderFactory::create("openai", &config.llm, &config.limits, None)?;
//!     let classifier = Classifier::new(
//!         ImagePreparer::new(&config),
//!         provider,
//!         ClassifyOptions::default(),
//!     );
//!
//!     let records = classifier.classify_all(&["./shirt.jpg".into()], |_| {}).await;
//!     println!("{}", serde_json::to_string_pretty(&records)?);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod taxonomy;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, OutfitError, PipelineError, PipelineResult, Result};
pub use llm::{Classifier, ClassifyOptions, VisionProvider, VisionProviderFactory};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DiscoveredFile, ImagePreparer};
pub use taxonomy::{Category, Classification, DressCode, Season};
pub use types::{ClassificationFailure, ClassifiedImage, OutputRecord, PreparedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
