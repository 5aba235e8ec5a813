//! Pipeline events consumed by the run reporter.

use crate::media::{MediaCategory, MediaReference};

use super::pipeline::DownloadOutcome;

/// Byte accounting for one in-flight transfer with a known size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Final file name of the transfer.
    pub file_name: String,
    /// Bytes written so far.
    pub transferred: u64,
    /// Advertised total size.
    pub total: u64,
}

impl TransferProgress {
    /// Completion percentage, clamped to 100; a zero total counts as complete.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = self.transferred.saturating_mul(100) / self.total;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

/// Receives pipeline events. Every method defaults to doing nothing.
///
/// Calls arrive on the pipeline's task, in order, and must not block.
pub trait PipelineObserver: Send + Sync {
    /// A category with at least one task is about to start.
    fn category_started(&self, _category: MediaCategory, _task_count: usize) {}

    /// A task resolved its target path and is about to transfer.
    fn transfer_started(&self, _reference: &MediaReference, _file_name: &str, _total: Option<u64>) {}

    /// Bytes were written for a transfer whose size is known.
    fn transfer_progress(&self, _progress: &TransferProgress) {}

    /// A task finished, successfully or not.
    fn outcome_recorded(&self, _outcome: &DownloadOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(transferred: u64, total: u64) -> TransferProgress {
        TransferProgress {
            file_name: "clip.mp4".to_string(),
            transferred,
            total,
        }
    }

    #[test]
    fn test_percent_rounds_down() {
        assert_eq!(progress(0, 200).percent(), 0);
        assert_eq!(progress(199, 200).percent(), 99);
        assert_eq!(progress(200, 200).percent(), 100);
    }

    #[test]
    fn test_percent_clamps_overrun_and_zero_total() {
        assert_eq!(progress(500, 200).percent(), 100);
        assert_eq!(progress(0, 0).percent(), 100);
    }
}
