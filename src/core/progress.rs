use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Pipeline stage of a single file's conversion.
///
/// A file moves Waiting → Decoding → Transforming → Encoding → Done, or to
/// Error from any stage. Stages only advance; the reported percentage for a
/// file never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStage {
    Waiting,
    Decoding,
    Transforming,
    Encoding,
    Done,
    Error,
}

// Per-file progress milestones, matching the stage transitions.
pub const PROGRESS_DECODE_START: u8 = 10;
pub const PROGRESS_PRE_DECODED: u8 = 20;
pub const PROGRESS_DECODED: u8 = 25;
pub const PROGRESS_TRANSFORM_START: u8 = 50;
pub const PROGRESS_RASTERIZED: u8 = 75;
pub const PROGRESS_DONE: u8 = 100;

/// Wraps a progress sink and enforces monotonicity.
///
/// Values are forwarded only when they exceed the last reported one, so the
/// sequence a caller observes is strictly increasing and 100 is emitted at
/// most once.
pub struct ProgressReporter<F: FnMut(u8)> {
    sink: F,
    last: Option<u8>,
}

impl<F: FnMut(u8)> ProgressReporter<F> {
    pub fn new(sink: F) -> Self {
        Self { sink, last: None }
    }

    /// Reports `percent`, clamped to 100. Stale or repeated values are dropped.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        (self.sink)(percent);
    }
}

/// Unified progress event for batch conversions.
///
/// Emitted by the batch processor to its caller; `file_progress` carries the
/// per-file percentage when the event concerns a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of completed files
    pub completed_tasks: usize,
    /// Total number of files in the batch
    pub total_tasks: usize,
    /// Batch-level progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Filename of the file this event concerns
    #[serde(default)]
    pub file_name: Option<String>,
    /// Per-file progress percentage (0-100)
    #[serde(default)]
    pub file_progress: Option<u8>,
    /// Error message for failed files
    #[serde(default)]
    pub error: Option<String>,
    /// Optional additional metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            file_progress: None,
            error: None,
            metadata: None,
        }
    }

    pub fn with_file(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_file_progress(mut self, percent: u8) -> Self {
        self.file_progress = Some(percent);
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_drops_stale_values() {
        let mut seen = Vec::new();
        {
            let mut reporter = ProgressReporter::new(|p| seen.push(p));
            reporter.report(10);
            reporter.report(25);
            reporter.report(20); // stale, dropped
            reporter.report(25); // repeat, dropped
            reporter.report(100);
            reporter.report(100); // 100 only once
        }
        assert_eq!(seen, vec![10, 25, 100]);
    }

    #[test]
    fn reporter_clamps_overflow() {
        let mut seen = Vec::new();
        {
            let mut reporter = ProgressReporter::new(|p| seen.push(p));
            reporter.report(150);
        }
        assert_eq!(seen, vec![100]);
    }

    #[test]
    fn batch_percentage_is_derived() {
        let progress = Progress::new(ProgressType::Progress, 2, 5, "processing");
        assert_eq!(progress.progress_percentage, 40);

        let empty = Progress::new(ProgressType::Start, 0, 0, "starting");
        assert_eq!(empty.progress_percentage, 0);
    }
}
