//! Outfit CLI - Clothing image classification via multimodal vision providers.
//!
//! Outfit takes clothing images as input and outputs structured
//! classifications: primary color, garment category, dress code, and
//! seasons, validated against a fixed taxonomy.
//!
//! # Usage
//!
//! ```bash
//! # Classify a single image
//! outfit classify shirt.jpg
//!
//! # Classify a directory
//! outfit classify ./wardrobe/ --output results.json
//!
//! # View configuration
//! outfit config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Outfit - Clothing image classification via multimodal vision providers.
#[derive(Parser, Debug)]
#[command(name = "outfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify clothing images against the fixed taxonomy
    Classify(cli::classify::ClassifyArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match outfit_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `outfit config path`."
            );
            outfit_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Outfit v{}", outfit_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Classify(args) => cli::classify::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
