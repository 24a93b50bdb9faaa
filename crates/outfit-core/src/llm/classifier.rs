//! Batched concurrent classification with per-item error isolation.
//!
//! Input paths are split into fixed-size batches. Batches run sequentially;
//! items within a batch run concurrently, one task per image. Every task
//! runs the full chain (precondition, request, provider call, reply
//! validation) and any failure becomes an error record for that item alone.
//! Results come back one record per input, in input order.

use super::provider::{ClassifyRequest, VisionProvider};
use super::reply;
use crate::error::PipelineError;
use crate::pipeline::ImagePreparer;
use crate::types::{ClassificationFailure, ClassifiedImage, OutputRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for the batch classifier.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Number of images dispatched concurrently per batch
    pub batch_size: usize,
    /// Maximum tokens the provider may generate per reply
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_tokens: 300,
            temperature: 0.0,
        }
    }
}

/// Batch classification engine.
pub struct Classifier {
    preparer: Arc<ImagePreparer>,
    provider: Arc<dyn VisionProvider>,
    options: ClassifyOptions,
}

impl Classifier {
    pub fn new(
        preparer: ImagePreparer,
        provider: Box<dyn VisionProvider>,
        options: ClassifyOptions,
    ) -> Self {
        Self {
            preparer: Arc::new(preparer),
            provider: Arc::from(provider),
            options,
        }
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<crate::pipeline::DiscoveredFile> {
        self.preparer.discover(path)
    }

    /// Classify every path, returning one record per input in input order.
    ///
    /// `on_record` fires once per finished record, in input order within
    /// each batch, so callers can stream output and advance progress.
    pub async fn classify_all<F>(&self, paths: &[PathBuf], mut on_record: F) -> Vec<OutputRecord>
    where
        F: FnMut(&OutputRecord),
    {
        let mut records = Vec::with_capacity(paths.len());
        let batch_size = self.options.batch_size.max(1);

        for batch in paths.chunks(batch_size) {
            tracing::debug!(
                "Dispatching batch of {} via {}",
                batch.len(),
                self.provider.name()
            );

            let mut handles = Vec::with_capacity(batch.len());
            for path in batch {
                let preparer = self.preparer.clone();
                let provider = self.provider.clone();
                let options = self.options.clone();
                let path = path.clone();

                handles.push(tokio::spawn(async move {
                    classify_single(&preparer, &provider, &options, &path).await
                }));
            }

            // Joining in spawn order keeps records in input order regardless
            // of completion order.
            for (path, handle) in batch.iter().zip(handles) {
                let record = match handle.await {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::error!("Classification task panicked: {e}");
                        OutputRecord::Error(ClassificationFailure {
                            file_path: path.clone(),
                            error: format!("Task panicked: {e}"),
                        })
                    }
                };
                on_record(&record);
                records.push(record);
            }
        }

        records
    }
}

/// Run the full chain for one image; any error becomes an error record.
async fn classify_single(
    preparer: &ImagePreparer,
    provider: &Arc<dyn VisionProvider>,
    options: &ClassifyOptions,
    path: &Path,
) -> OutputRecord {
    match classify_inner(preparer, provider, options, path).await {
        Ok(image) => OutputRecord::Ok(Box::new(image)),
        Err(e) => {
            tracing::error!("Classification failed: {:?} - {}", path, e);
            OutputRecord::Error(ClassificationFailure {
                file_path: path.to_path_buf(),
                error: e.to_string(),
            })
        }
    }
}

async fn classify_inner(
    preparer: &ImagePreparer,
    provider: &Arc<dyn VisionProvider>,
    options: &ClassifyOptions,
    path: &Path,
) -> Result<ClassifiedImage, PipelineError> {
    let prepared = preparer.prepare(path).await?;

    let request = ClassifyRequest::for_image(
        prepared.payload.clone(),
        options.max_tokens,
        options.temperature,
    );
    let provider_reply = provider.classify(&request).await?;

    let classification = reply::parse_classification(&provider_reply.text)?;

    Ok(ClassifiedImage {
        file_path: prepared.file_path,
        file_name: prepared.file_name,
        width: prepared.width,
        height: prepared.height,
        format: prepared.format,
        resized: prepared.resized,
        classification,
        model: provider_reply.model,
        latency_ms: provider_reply.latency_ms,
        tokens: provider_reply.tokens_used,
    })
}
