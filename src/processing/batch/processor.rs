use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use crate::core::{ConversionOutput, ConversionRequest, Progress, ProgressType};
use crate::processing::pipeline::convert;
use crate::utils::error::ConverterError;
use crate::utils::ConverterResult;

const DEFAULT_WORKERS: usize = 4;

/// Outcome of one file in a batch. Failures are per-file; they never abort
/// sibling conversions.
#[derive(Debug)]
pub struct FileOutcome {
    /// Position of the file in the submitted batch
    pub index: usize,
    /// Original filename of the file
    pub filename: String,
    /// The conversion result or the single error that stopped it
    pub result: ConverterResult<ConversionOutput>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Processes batches of conversion requests concurrently.
///
/// Concurrency is bounded by a semaphore; the pipeline itself runs on the
/// blocking thread pool so codec work never stalls the async runtime. Files
/// own their buffers exclusively, so no locking is needed beyond the permit.
#[derive(Clone)]
pub struct BatchProcessor {
    semaphore: Arc<Semaphore>,
    worker_count: usize,
}

impl BatchProcessor {
    pub fn new(worker_count: Option<usize>) -> Self {
        let worker_count = worker_count.unwrap_or(DEFAULT_WORKERS).max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count,
        }
    }

    /// Converts a single request, reporting per-file progress percentages.
    pub async fn process(
        &self,
        request: ConversionRequest,
        on_progress: impl FnMut(u8) + Send + 'static,
    ) -> ConverterResult<ConversionOutput> {
        let _permit = self.semaphore.clone().acquire_owned().await?;
        tokio::task::spawn_blocking(move || convert(&request, on_progress)).await?
    }

    /// Converts every request in the batch, at most `worker_count` at a time.
    ///
    /// Returns one outcome per request, in submission order. `on_progress`
    /// receives batch-level events interleaved with per-file percentages; the
    /// events of different files carry no ordering guarantee relative to each
    /// other.
    pub async fn process_batch(
        &self,
        requests: Vec<ConversionRequest>,
        on_progress: impl Fn(Progress) + Send + Sync + 'static,
    ) -> Vec<FileOutcome> {
        let total = requests.len();
        let on_progress: Arc<dyn Fn(Progress) + Send + Sync> = Arc::new(on_progress);
        let completed = Arc::new(AtomicUsize::new(0));

        info!(
            "Processing batch of {} files with {} workers",
            total, self.worker_count
        );
        on_progress(Progress::new(ProgressType::Start, 0, total, "starting"));

        let mut handles = Vec::with_capacity(total);
        for (index, request) in requests.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let on_progress = Arc::clone(&on_progress);
            let completed = Arc::clone(&completed);

            handles.push(tokio::spawn(async move {
                let filename = request.filename.clone();

                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return FileOutcome {
                            index,
                            filename,
                            result: Err(ConverterError::from(e)),
                        };
                    }
                };

                debug!("Worker permit acquired for '{}'", filename);

                let file_progress = {
                    let on_progress = Arc::clone(&on_progress);
                    let completed = Arc::clone(&completed);
                    let filename = filename.clone();
                    move |pct: u8| {
                        let done = completed.load(Ordering::Relaxed);
                        on_progress(
                            Progress::new(ProgressType::Progress, done, total, "processing")
                                .with_file(&filename)
                                .with_file_progress(pct),
                        );
                    }
                };

                let result = tokio::task::spawn_blocking(move || convert(&request, file_progress))
                    .await
                    .unwrap_or_else(|e| Err(ConverterError::from(e)));
                drop(permit);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                match &result {
                    Ok(output) => {
                        debug!(
                            "'{}' converted to {:?} ({} bytes)",
                            filename, output.effective_format, output.byte_size
                        );
                        let metadata = serde_json::json!({
                            "byteSize": output.byte_size,
                            "effectiveFormat": output.effective_format,
                            "extension": output.extension,
                            "width": output.width,
                            "height": output.height,
                        });
                        let status = if done == total { "complete" } else { "processing" };
                        let mut event = Progress::new(ProgressType::Complete, done, total, status)
                            .with_file(&filename)
                            .with_file_progress(100);
                        event.metadata = Some(metadata);
                        on_progress(event);
                    }
                    Err(e) => {
                        warn!("Conversion failed for '{}': {}", filename, e);
                        on_progress(
                            Progress::new(ProgressType::Error, done, total, "error")
                                .with_file(&filename)
                                .with_error(&e.to_string()),
                        );
                    }
                }

                FileOutcome {
                    index,
                    filename,
                    result,
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // Handles are awaited in submission order, so the slot
                    // index matches even for a panicked task.
                    warn!("Conversion task join failed: {}", e);
                    outcomes.push(FileOutcome {
                        index: outcomes.len(),
                        filename: String::new(),
                        result: Err(ConverterError::from(e)),
                    });
                }
            }
        }

        outcomes.sort_by_key(|o| o.index);

        let failures = outcomes.iter().filter(|o| !o.is_success()).count();
        if failures > 0 {
            warn!(
                "Batch completed with {} failed files out of {}",
                failures, total
            );
        } else {
            info!("Batch completed: {} files converted", total);
        }

        outcomes
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(None)
    }
}
