//! Run reporter: per-transfer progress bars and the end-of-run summary.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use media_harvester::download::TaskStatus;
use media_harvester::{
    DownloadOutcome, MediaCategory, MediaReference, PipelineObserver, SessionReport,
    TransferProgress,
};
use tracing::{debug, info, warn};

const BAR_TEMPLATE: &str = "{msg:30!} [{bar:30.cyan/blue}] {percent:>3}% {bytes}/{total_bytes}";

/// Progress observer for the binary.
///
/// With bars disabled (quiet mode, no terminal) progress is logged at debug
/// level in quarter steps instead.
pub(crate) struct ProgressReporter {
    use_bars: bool,
    state: Mutex<TransferState>,
}

#[derive(Default)]
struct TransferState {
    bar: Option<ProgressBar>,
    last_logged_quarter: u8,
}

impl ProgressReporter {
    pub(crate) fn new(use_bars: bool) -> Self {
        Self {
            use_bars,
            state: Mutex::new(TransferState::default()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TransferState) -> T) -> T {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl PipelineObserver for ProgressReporter {
    fn category_started(&self, category: MediaCategory, task_count: usize) {
        info!("Downloading {task_count} {}...", category.label());
    }

    fn transfer_started(&self, reference: &MediaReference, file_name: &str, total: Option<u64>) {
        debug!(reference = %reference.display_short(), file = file_name, ?total, "transfer started");
        self.with_state(|state| {
            state.last_logged_quarter = 0;
            state.bar = match total {
                Some(total) if self.use_bars => {
                    let bar = ProgressBar::new(total);
                    bar.set_style(
                        ProgressStyle::with_template(BAR_TEMPLATE)
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("=> "),
                    );
                    bar.set_message(file_name.to_string());
                    Some(bar)
                }
                _ => None,
            };
        });
    }

    fn transfer_progress(&self, progress: &TransferProgress) {
        self.with_state(|state| {
            if let Some(bar) = &state.bar {
                bar.set_position(progress.transferred);
                return;
            }
            let quarter = progress.percent() / 25;
            if quarter > state.last_logged_quarter {
                state.last_logged_quarter = quarter;
                debug!(file = %progress.file_name, percent = progress.percent(), "transfer progress");
            }
        });
    }

    fn outcome_recorded(&self, outcome: &DownloadOutcome) {
        self.with_state(|state| {
            if let Some(bar) = state.bar.take() {
                bar.finish_and_clear();
            }
        });

        let reference = outcome.task.reference.display_short();
        match outcome.status {
            TaskStatus::Succeeded => {
                let saved = outcome
                    .final_path
                    .as_deref()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                info!("Saved {saved} ({} bytes)", outcome.bytes_written);
            }
            TaskStatus::Failed => warn!(
                "Failed {reference}: {}",
                outcome.error_detail.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Logs the end-of-run summary.
pub(crate) fn print_summary(report: &SessionReport) {
    match &report.session_root {
        None => info!("No media found to download."),
        Some(root) => {
            info!(
                images = report.images_found,
                videos = report.videos_found,
                discarded = report.discarded,
                "Found {} media item(s)",
                report.images_found + report.videos_found
            );
            info!(
                succeeded = report.summary.succeeded,
                failed = report.summary.failed,
                "Download complete: {} succeeded, {} failed",
                report.summary.succeeded,
                report.summary.failed
            );
            info!("Files saved to {}", root.display());
        }
    }
}
