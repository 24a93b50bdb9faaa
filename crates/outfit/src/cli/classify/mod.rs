//! The `outfit classify` command for classifying clothing images.

mod setup;
pub mod types;

pub use types::{OutputFormat, Provider};

use clap::Args;
use outfit_core::{OutputFormat as CoreOutputFormat, OutputRecord, OutputWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use setup::setup_classifier;

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file or directory to classify
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of images dispatched concurrently per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Vision provider (defaults to the configured provider)
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs) -> anyhow::Result<()> {
    let input = expand_path(&args.input);
    let ctx = setup_classifier(&args, &input)?;

    let files = ctx.classifier.discover(&input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", input);
        // Zero matches still produce an (empty) result list
        write_records(&ctx, &args, &[])?;
        return Ok(());
    }
    tracing::info!("Found {} image(s) to classify", files.len());

    let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();

    // JSONL to stdout streams records as they finish; everything else is
    // written once at the end.
    let stream_stdout =
        matches!(ctx.output_format, CoreOutputFormat::JsonLines) && args.output.is_none();

    let progress = if paths.len() > 1 {
        Some(create_progress_bar(paths.len() as u64))
    } else {
        None
    };

    let start = std::time::Instant::now();
    let records = ctx
        .classifier
        .classify_all(&paths, |record| {
            if stream_stdout {
                if let Ok(line) = serde_json::to_string(record) {
                    println!("{line}");
                }
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        })
        .await;
    let elapsed = start.elapsed();

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    if !stream_stdout {
        write_records(&ctx, &args, &records)?;
    }

    if input.is_dir() {
        print_summary(&records, elapsed);
    }

    Ok(())
}

/// Write all records to the output file, or stdout if none was given.
fn write_records(
    ctx: &setup::ClassifyContext,
    args: &ClassifyArgs,
    records: &[OutputRecord],
) -> anyhow::Result<()> {
    if let Some(ref output) = args.output {
        let output_path = expand_path(output);
        let file = File::create(&output_path)?;
        let mut writer = OutputWriter::new(BufWriter::new(file), ctx.output_format, ctx.pretty);
        writer.write_all(records)?;
        writer.flush()?;
        tracing::info!("Results saved to {:?}", output_path);
    } else {
        match ctx.output_format {
            CoreOutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(records)?);
            }
            CoreOutputFormat::JsonLines => {
                for record in records {
                    println!("{}", serde_json::to_string(record)?);
                }
            }
        }
    }
    Ok(())
}

/// Expand a leading `~` in a path argument.
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Create a progress bar for batch classification.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("classifying...");
    pb
}

/// Print a formatted summary table after a directory run.
fn print_summary(records: &[OutputRecord], elapsed: std::time::Duration) {
    let succeeded = records.iter().filter(|r| r.is_ok()).count();
    let failed = records.len() - succeeded;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        records.len() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Classified:   {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", records.len());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_passthrough() {
        assert_eq!(
            expand_path(Path::new("/photos/shirt.jpg")),
            PathBuf::from("/photos/shirt.jpg")
        );
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path(Path::new("~/wardrobe"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("wardrobe"));
    }
}
